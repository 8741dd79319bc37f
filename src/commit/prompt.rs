//! Prompt construction for AI-generated commit messages.

use crate::git::GitState;

const PREAMBLE: &str =
    "You are an expert DevOps engineer specialized in writing git commit messages.\n\n";

const STATE_HEADER: &str = "=== SPECIAL GIT STATE CONTEXT ===\n\n";
const STATE_FOOTER: &str = "=================================\n\n";

const TYPE_GUIDANCE: &str = "\
2. Analyze the diff and choose the appropriate <type> based on the changes:
   - feat: if adding new features or capabilities
   - fix: if fixing bugs or issues
   - refactor: if restructuring code without changing functionality
   - chore: if updating dependencies, configs, or maintenance tasks
   - docs: if primarily documentation changes
";

const GENERAL_INSTRUCTIONS: &str = "\
Analyze the following code diff.

First, determine whether the diff represents a single logical change or multiple independent changes that should be split into smaller commits to follow clean code and best practices.

If the diff should be split, briefly state that it can be broken down and list the suggested commit scopes or purposes (do not generate the commits yet).

If the diff represents a single logical change, generate a single-line git commit message following the Conventional Commits specification.

Format for commit message:
<type>(<scope>): <description>

Allowed types: feat, fix, docs, style, refactor, test, chore.

IMPORTANT: Use past tense for the description (e.g., 'added feature' not 'add feature', 'fixed bug' not 'fix bug').

Do not output anything other than the message or the split suggestion.

";

/// Build the LLM prompt for generating a commit message.
///
/// The output is fully determined by the inputs. Empty `rules` omits the
/// Team Rules block; a `Normal` state omits the state context block.
pub fn build_prompt(diff: &str, rules: &str, state: &GitState) -> String {
    let mut prompt = String::with_capacity(diff.len() + rules.len() + 4096);
    prompt.push_str(PREAMBLE);

    if !matches!(state, GitState::Normal) {
        prompt.push_str(STATE_HEADER);
        push_state_block(&mut prompt, state);
        prompt.push_str(STATE_FOOTER);
    }

    prompt.push_str(GENERAL_INSTRUCTIONS);

    if !rules.is_empty() {
        prompt.push_str("Team Rules:\n");
        prompt.push_str(rules);
        prompt.push_str("\n\n");
    }

    prompt.push_str("Diff:\n");
    prompt.push_str(diff);
    prompt
}

fn push_state_block(prompt: &mut String, state: &GitState) {
    let original = state.original_message();

    match state {
        GitState::Normal => {}
        GitState::Merge { .. } => {
            prompt.push_str("CONTEXT: You are completing a MERGE CONFLICT resolution.\n");
            if let Some(message) = original {
                prompt.push_str(&format!("Original merge intent: \"{message}\"\n"));
            }
            prompt.push_str("\nIMPORTANT INSTRUCTIONS:\n");
            prompt.push_str("1. You MUST use the following EXACT format for the first line:\n");
            prompt.push_str("   <type>(merge): Merged <Source_Branch> into <Target_Branch>\n");
            prompt.push_str(TYPE_GUIDANCE);
            prompt.push_str("3. Extract <Source_Branch> from the Original merge intent (e.g. 'Merge branch feature-x' -> feature-x).\n");
            prompt.push_str("4. If <Target_Branch> is unknown, use 'main' or infer from the diff/context.\n");
            prompt.push_str("5. After the first line, leave a blank line and then provide a detailed description of what code changes were merged.\n");
            prompt.push_str("6. Explain HOW conflicts were resolved if applicable.\n");
            prompt.push_str("7. Example First Line: feat(merge): Merged feature-auth into main\n\n");
        }
        GitState::Rebase { .. } => {
            prompt.push_str("CONTEXT: You are completing a REBASE conflict resolution.\n");
            if let Some(message) = original {
                prompt.push_str(&format!("Rebase context: {message}\n"));
            }
            prompt.push_str("\nIMPORTANT INSTRUCTIONS:\n");
            prompt.push_str("1. You MUST use the following EXACT format for the first line:\n");
            prompt.push_str("   <type>(rebase): Rebased <Branch_Name> onto <Target_Branch>\n");
            prompt.push_str(TYPE_GUIDANCE);
            prompt.push_str("3. Extract <Branch_Name> from the Rebase context if available, otherwise infer from diff.\n");
            prompt.push_str("4. If <Target_Branch> is unknown, use 'main' or infer from context.\n");
            prompt.push_str("5. After the first line, leave a blank line and then provide a detailed description of what code changes were rebased.\n");
            prompt.push_str("6. Explain HOW conflicts were resolved if applicable.\n");
            prompt.push_str("7. Example First Line: feat(rebase): Rebased feature-auth onto main\n\n");
        }
        GitState::CherryPick { .. } => {
            prompt.push_str("CONTEXT: You are completing a CHERRY-PICK operation.\n");
            if let Some(message) = original {
                prompt.push_str(&format!("Original commit: \"{message}\"\n"));
            }
            prompt.push_str("\nIMPORTANT INSTRUCTIONS:\n");
            prompt.push_str("1. You MUST use the following EXACT format for the first line:\n");
            prompt.push_str("   <type>(cherry-pick): Cherry-picked <Commit_Description> into <Target_Branch>\n");
            prompt.push_str("   ⚠️  CRITICAL: The scope MUST be 'cherry-pick', NOT the original scope from the commit!\n");
            prompt.push_str(TYPE_GUIDANCE);
            prompt.push_str("3. Extract <Commit_Description> from the Original commit message if available.\n");
            prompt.push_str("4. If <Target_Branch> is unknown, use 'main' or infer from context.\n");
            prompt.push_str("5. After the first line, leave a blank line and then provide a detailed description of what was cherry-picked.\n");
            prompt.push_str("6. Explain HOW conflicts were resolved and what adaptations were made if applicable.\n");
            prompt.push_str("7. CORRECT Example: docs(cherry-pick): Cherry-picked feature entries update into main\n");
            prompt.push_str("8. WRONG Example: docs(file): updated feature entries (missing cherry-pick scope!)\n\n");
        }
    }
}
