//! Activation hooks that wire a shell's completion to `_completion`
//!
//! Each hook forwards the line being edited and the cursor position to the
//! program in `COMP_LINE` / `COMP_POINT` and hands the printed candidates to
//! the shell's completion builtin.

use clap_complete::Shell;

use super::output::shell_quote;
use crate::error::{CompletionError, Result};

const BASH_HOOK: &str = r#"# BEGIN tabcomp completion for %%ALIAS%%
function %%FUNCTION%% {
    local program=%%PROGRAM%%
    local RESULT STATUS cur

    RESULT="$(COMP_LINE="$COMP_LINE" \
              COMP_POINT="$COMP_POINT" \
              COMP_WORDBREAKS="$COMP_WORDBREAKS" \
              "$program" %%COMMAND%% --shell-type bash </dev/null)"
    STATUS=$?
    if [ $STATUS -ne 0 ]; then
        return $STATUS
    fi

    eval "COMPREPLY=($RESULT)"

    # bash splits words on ':', candidates keep it
    if declare -F _get_comp_words_by_ref >/dev/null 2>&1 &&
        declare -F __ltrim_colon_completions >/dev/null 2>&1; then
        _get_comp_words_by_ref -n : cur
        __ltrim_colon_completions "$cur"
    fi
}
complete -o default -F %%FUNCTION%% %%ALIAS%%
# END tabcomp completion for %%ALIAS%%
"#;

const ZSH_HOOK: &str = r#"# BEGIN tabcomp completion for %%ALIAS%%
function %%FUNCTION%% {
    local program=%%PROGRAM%%
    local RESULT
    local -a candidates

    RESULT="$(COMP_LINE="$BUFFER" \
              COMP_POINT="$CURSOR" \
              "$program" %%COMMAND%% --shell-type zsh </dev/null)" || return

    candidates=(${(f)RESULT})
    _describe %%ALIAS%% candidates
}
compdef %%FUNCTION%% %%ALIAS%%
# END tabcomp completion for %%ALIAS%%
"#;

const FISH_HOOK: &str = r#"# BEGIN tabcomp completion for %%ALIAS%%
function %%FUNCTION%%
    set -l program %%PROGRAM%%
    set -lx COMP_LINE (commandline -p)
    set -lx COMP_POINT (commandline -pc | string join \n | string length)
    $program %%COMMAND%% --shell-type fish </dev/null
end
complete -c %%ALIAS%% -f -a '(%%FUNCTION%%)'
# END tabcomp completion for %%ALIAS%%
"#;

/// Generate the activation hook for `shell`
///
/// # Arguments
/// * `shell` - Target shell (bash, zsh or fish)
/// * `program` - Path of the program answering completion requests
/// * `alias` - Command name completion is registered for
/// * `invocation` - Arguments that reach the completion sub-command, such as
///   `_completion` or `--config '/etc/app.toml' complete`
/// * `multiple` - Call whichever program the user typed instead of `program`
///
/// # Returns
/// * `Result<String>` - Script to `eval` or `source` in the shell
pub fn generate_hook(
    shell: Shell,
    program: &str,
    alias: &str,
    invocation: &str,
    multiple: bool,
) -> Result<String> {
    let (template, typed_program) = match shell {
        Shell::Bash => (BASH_HOOK, r#""${COMP_WORDS[0]}""#),
        Shell::Zsh => (ZSH_HOOK, r#""${words[1]}""#),
        Shell::Fish => (FISH_HOOK, "(commandline -opc)[1]"),
        other => return Err(CompletionError::UnsupportedShell(other.to_string())),
    };

    let program = if multiple {
        typed_program.to_string()
    } else {
        shell_quote(program)
    };

    tracing::debug!(%shell, alias, multiple, "generating completion hook");

    Ok(template
        .replace("%%FUNCTION%%", &function_name(alias))
        .replace("%%PROGRAM%%", &program)
        .replace("%%COMMAND%%", invocation)
        .replace("%%ALIAS%%", &shell_quote(alias)))
}

/// Shell function name derived from the alias
fn function_name(alias: &str) -> String {
    let suffix: String = alias
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("_tabcomp_complete_{suffix}")
}
