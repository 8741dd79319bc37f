//! Pre-commit hook scripts that run the generator and commit on approval.

use std::fmt;
use std::path::Path;

/// Shell flavour of the generated hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// File name under `.git/hooks`.
    pub fn hook_file_name(self) -> &'static str {
        match self {
            Platform::Unix => "pre-commit",
            Platform::Windows => "pre-commit.bat",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Unix => write!(f, "unix"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

const EXE_PLACEHOLDER: &str = "{exe}";

const UNIX_HOOK: &str = r#"#!/bin/bash
# Pre-commit hook for generate-commit

# Nothing staged, let git handle it
if git diff --staged --quiet; then
    exit 0
fi

OUTPUT=$("{exe}")
EXIT_CODE=$?

if [ $EXIT_CODE -ne 0 ]; then
    echo "Error generating commit message: $OUTPUT"
    exit 1
fi

COMMIT_MSG=$(echo "$OUTPUT" \
    | grep -v "Generating commit message" \
    | sed 's/\x1b\[[0-9;]*m//g' \
    | sed 's/^[[:space:]]*//' \
    | sed '/^$/d')

if [ -z "$COMMIT_MSG" ]; then
    echo "No commit message generated"
    exit 1
fi

echo ""
echo "Generated commit message:"
echo "=========================="
echo "$COMMIT_MSG"
echo "=========================="
echo ""
echo "Options:"
echo "  [A]ccept and commit"
echo "  [R]eject (abort commit)"
echo "  [E]dit message"
echo ""

exec < /dev/tty
read -p "Your choice (A/R/E): " choice

# The hook commits itself, so the original commit is always aborted.
case "$choice" in
    [Aa]*)
        git commit -m "$COMMIT_MSG" --no-verify
        exit 1
        ;;
    [Rr]*)
        echo "Commit aborted by user"
        exit 1
        ;;
    [Ee]*)
        MSG_FILE=$(mktemp)
        echo "$COMMIT_MSG" > "$MSG_FILE"
        ${EDITOR:-nano} "$MSG_FILE"
        git commit -F "$MSG_FILE" --no-verify
        rm -f "$MSG_FILE"
        exit 1
        ;;
    *)
        echo "Invalid choice. Aborting commit."
        exit 1
        ;;
esac
"#;

const WINDOWS_HOOK: &str = r#"@echo off
REM Pre-commit hook for generate-commit

git diff --staged --quiet >nul 2>&1
if %errorlevel% equ 0 exit /b 0

set COMMIT_MSG=
for /f "delims=" %%i in ('"{exe}" 2^>nul') do set COMMIT_MSG=%%i
if errorlevel 1 (
    echo Error generating commit message
    exit /b 1
)

if "%COMMIT_MSG%"=="" (
    echo No commit message generated
    exit /b 1
)

echo.
echo Generated commit message:
echo ==========================
echo %COMMIT_MSG%
echo ==========================
echo.
echo Options:
echo   [A]ccept and commit
echo   [R]eject (abort commit)
echo   [E]dit message
echo.
set /p CHOICE=Your choice (A/R/E):

if /i "%CHOICE:~0,1%"=="A" goto accept
if /i "%CHOICE:~0,1%"=="R" goto reject
if /i "%CHOICE:~0,1%"=="E" goto edit
echo Invalid choice. Aborting commit.
exit /b 1

:accept
git commit -m "%COMMIT_MSG%" --no-verify
exit /b 1

:reject
echo Commit aborted by user
exit /b 1

:edit
echo %COMMIT_MSG%> "%TEMP%\commit_msg.txt"
notepad "%TEMP%\commit_msg.txt"
git commit -F "%TEMP%\commit_msg.txt" --no-verify
del "%TEMP%\commit_msg.txt"
exit /b 1
"#;

/// Render the hook script that invokes the generator at `exe_path`.
pub fn pre_commit_script(exe_path: &Path, platform: Platform) -> String {
    let exe = exe_path.display().to_string();
    let template = match platform {
        Platform::Unix => UNIX_HOOK,
        Platform::Windows => WINDOWS_HOOK,
    };
    template.replace(EXE_PLACEHOLDER, &exe)
}
