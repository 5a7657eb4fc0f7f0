use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

use crate::ai::response::parse_import_response;
use crate::ai::{AiError, ChatProvider, ImportProvider, ImportSource, IMPORT_INSTRUCTION};
use crate::config::AiConfig;
use crate::model::import::AiImportResult;

/// Instruction for the model.
pub const INSTRUCTION_ENV: &str = "TIMETABLE_AI_INSTRUCTION";
/// MIME type of whatever arrives on stdin.
pub const MIME_ENV: &str = "TIMETABLE_AI_MIME";

/// Delegates to an external program: instruction and MIME type in the
/// environment, payload on stdin, the model's reply on stdout.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
}

impl CommandProvider {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let program = config
            .command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or(AiError::NotConfigured)?;
        Ok(Self::new(program, config.args.clone()))
    }

    fn run(&self, instruction: &str, mime_type: &str, payload: &[u8]) -> Result<String, AiError> {
        debug!(program = %self.program, mime_type, bytes = payload.len(), "calling AI command");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(INSTRUCTION_ENV, instruction)
            .env(MIME_ENV, mime_type)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // stdin is fed from its own thread while stdout and stderr drain, so a
        // child that stops reading early still gets waited on.
        let stdin = child.stdin.take();
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(payload),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (output, writer.join())
        });
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = %output.status, "AI command failed");
            return Err(AiError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("AI command exited before reading all input");
            }
            Ok(Err(e)) => return Err(AiError::Io(e)),
            Err(_) => return Err(AiError::Io(io::Error::other("stdin writer panicked"))),
        }
        String::from_utf8(output.stdout).map_err(|_| AiError::Utf8)
    }
}

impl ImportProvider for CommandProvider {
    fn extract(&self, source: &ImportSource) -> Result<AiImportResult, AiError> {
        let reply = match source {
            ImportSource::Document { bytes, mime_type } => {
                if bytes.is_empty() {
                    return Err(AiError::EmptyInput);
                }
                self.run(IMPORT_INSTRUCTION, mime_type, bytes)?
            }
            ImportSource::Text(text) => {
                if text.trim().is_empty() {
                    return Err(AiError::EmptyInput);
                }
                self.run(IMPORT_INSTRUCTION, "text/plain", text.as_bytes())?
            }
        };
        parse_import_response(&reply)
    }
}

impl ChatProvider for CommandProvider {
    fn answer(&self, system_instruction: &str, prompt: &str) -> Result<String, AiError> {
        self.run(system_instruction, "text/plain", prompt.as_bytes())
            .map(|reply| reply.trim().to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandProvider {
        CommandProvider::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn test_unconfigured() {
        assert!(matches!(
            CommandProvider::from_config(&AiConfig::default()),
            Err(AiError::NotConfigured)
        ));
    }

    #[test]
    fn test_chat_passes_instruction_and_prompt() {
        let provider = shell(r#"printf '%s|' "$TIMETABLE_AI_INSTRUCTION"; cat"#);
        let reply = provider.answer("be brief", "who teaches 10A?").unwrap();
        assert_eq!(reply, "be brief|who teaches 10A?");
    }

    #[test]
    fn test_extract_parses_stdout() {
        let provider = shell(r#"cat > /dev/null; echo '{"detectedType":"CLASS_WISE","profiles":[{"name":"G9","schedule":{"Sat":{"1":{"subject":"ENG","code":"JD"}}}}],"unknownCodes":["JD"]}'"#);
        let result = provider
            .extract(&ImportSource::Text("G9 timetable".to_string()))
            .unwrap();
        assert_eq!(result.profiles[0].name, "G9");
        assert_eq!(result.unknown_codes, vec!["JD".to_string()]);
    }

    #[test]
    fn test_failing_command_reports_stderr() {
        let provider = shell("cat > /dev/null; echo quota exceeded >&2; exit 3");
        match provider.answer("x", "y") {
            Err(AiError::Failed { stderr, .. }) => assert_eq!(stderr, "quota exceeded"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_early_exit_reports_stderr_not_broken_pipe() {
        let provider = shell("echo quota exceeded >&2; exit 3");
        let source = ImportSource::Document {
            bytes: vec![b'%'; 1 << 20],
            mime_type: "application/pdf".to_string(),
        };
        match provider.extract(&source) {
            Err(AiError::Failed { stderr, .. }) => assert_eq!(stderr, "quota exceeded"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_large_payload_echoed_back() {
        let provider = shell("cat");
        let prompt = "a".repeat(1 << 20);
        let reply = provider.answer("echo", &prompt).unwrap();
        assert_eq!(reply.len(), prompt.len());
    }

    #[test]
    fn test_empty_text_is_rejected_before_running() {
        let provider = CommandProvider::new("/nonexistent/binary", Vec::new());
        assert!(matches!(
            provider.extract(&ImportSource::Text("  ".to_string())),
            Err(AiError::EmptyInput)
        ));
    }
}
