//! System prompt assembly.

use crate::tools::ToolSchema;

/// Build the instruction text sent with every generation call.
///
/// A pure function of the tool schema list: callers regenerate it whenever
/// the tool set changes rather than caching it across tool-set versions.
pub fn assemble(tools: &[ToolSchema]) -> String {
    let mut prompt = String::from(
        "You are a CRM assistant. You help the user work with their deals, \
         leads, contacts, organizations, pipelines, and tasks. Answer from \
         conversation context when you can, and use the available tools to \
         look up live CRM data when you cannot.\n",
    );

    if tools.is_empty() {
        prompt.push_str("No tools are available for this request; answer from the conversation alone.");
        return prompt;
    }

    prompt.push_str("Available tools:\n");
    for tool in tools {
        prompt.push_str(&format!("- {}: {}\n", tool.name, tool.description));
    }
    prompt.push_str(
        "Call a tool when live data would change your answer. After tool \
         results arrive, summarize them for the user in plain language.",
    );
    prompt
}
