//! Prompt construction for the analyst agent

use crate::Result;
use minijinja::Environment;

const REPORT_TASK_TEMPLATE: &str = include_str!("../templates/report_task.j2");

/// System prompt for the analyst persona
pub const SYSTEM_PROMPT: &str = "You are a seasoned China A-share equity analyst. You write \
    clear, structured research reports grounded strictly in the data returned by your tools. \
    You never invent figures; when a data category is unavailable you say so explicitly.";

/// Render the report task for one stock code
pub fn report_task(symbol: &str) -> Result<String> {
    let env = Environment::new();
    let rendered = env.render_str(
        REPORT_TASK_TEMPLATE,
        minijinja::context! { symbol => symbol },
    )?;
    Ok(rendered)
}
