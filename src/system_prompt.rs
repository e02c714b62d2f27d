//! Prompt construction for a conflict-resolution dialogue

use crate::fence::fence;

/// Phrase the model must use to announce a full resolved file
pub const RESOLUTION_SENTINEL: &str = "Updating the file!";

/// Heading for the merge notes injected into later dialogues
pub const NOTES_HEADING: &str = "Notes from our previous conversation about this merge:";

/// Build the system prompt for merging `merge_from` into `merge_to`.
pub fn build_system_prompt(merge_from: &str, merge_to: &str) -> String {
    format!(
        r#"You are a staff software engineer resolving merge conflicts in a git repository.
You are merging from {merge_from} to {merge_to}.
You will be looking at one file at a time.
Make sure you always resolve the conflicts and write out the whole file.
If you don't have enough information to resolve the conflict, ask me for more information without outputting the file.
You can look at any other file in the project with the provided tool, but cross reference what you find with me.
Always wrap your file output in plain triple backticks (```), without a type annotation such as ```python or ```json, so the file is written back exactly.

RULES:
- Never assume missing details. Outline what is unclear and ask simple questions. Look at other files first if that makes the questions simpler, but still ask.
- Never merge conflicts without being sure of the intended behaviour behind them. Ask for input.
- Pay attention to the notes from previous conversations about this merge. They may contain context that matters for the current file. Do not generalise them unless I say so.
- When you can resolve the conflicts, output the whole file, not only the resolved section.
- When you cannot resolve the conflicts, ask for more information and do not output the file.
- When printing the full file, say exactly "{RESOLUTION_SENTINEL}" instead of phrases like "Here is the resolved file:", then print the file."#
    )
}

/// First user turn: the file path followed by its fenced conflicted content.
pub fn seed_message(path: &str, content: &str) -> String {
    format!("{path}\n{}", fence(content))
}

/// Prior-context turn carrying the merge notes gathered so far.
pub fn notes_message(notes: &str) -> String {
    format!("{NOTES_HEADING}\n{notes}")
}
