use super::input::{parse_command, Command, END_OF_CODE, HELP};
use crate::coach::{CodeImage, Event, InferenceGateway, Session};
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::debug;

/// Run the interactive loop until `/quit` or end of input.
///
/// Each line is handled to completion before the next one is read. Failed
/// events are reported and the previous session is kept.
pub async fn run<G, R, W>(gateway: &G, mut session: Session, input: R, mut out: W) -> Result<()>
where
    G: InferenceGateway + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "Type /help for commands.")?;

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{}", message)?;
                continue;
            }
        };
        debug!(?command, "terminal command");

        let event = match command {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => {
                writeln!(out, "{}", HELP)?;
                continue;
            }
            Command::Hint => {
                render_hint(&session, &mut out)?;
                continue;
            }
            Command::Show => {
                writeln!(out, "[Code Assessment]\n{}", session.view().assessment_body)?;
                continue;
            }
            Command::State => {
                writeln!(out, "{}", serde_json::to_string_pretty(&session.view())?)?;
                continue;
            }
            Command::Image(path) => match CodeImage::from_path(&path) {
                Ok(image) => Event::UploadImage(image),
                Err(err) => {
                    writeln!(out, "error: {}", err)?;
                    continue;
                }
            },
            Command::Revise => {
                writeln!(
                    out,
                    "Paste your revised code; finish with a line containing only '{}'.",
                    END_OF_CODE
                )?;
                let mut code = Vec::new();
                let mut terminated = false;
                for line in lines.by_ref() {
                    let line = line?;
                    if line.trim() == END_OF_CODE {
                        terminated = true;
                        break;
                    }
                    code.push(line);
                }
                if !terminated {
                    writeln!(
                        out,
                        "error: revision not terminated with '{}'; nothing submitted",
                        END_OF_CODE
                    )?;
                    break;
                }
                Event::ReviseCode(code.join("\n"))
            }
            Command::Assess => Event::Initialize {
                problem: None,
                image: None,
            },
            Command::Problem(text) => Event::SetProblem(text),
            Command::More => Event::RequestMoreSpecific,
            Command::Reset => Event::Reset,
            Command::Ask(question) => Event::AskQuestion(question),
        };

        let rendered = RenderAs::for_event(&event);
        match session.handle(gateway, event).await {
            Ok(next) => {
                session = next;
                render(&session, rendered, &mut out)?;
            }
            Err(err) => writeln!(out, "error: {}", err)?,
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderAs {
    Assessment,
    Hint,
    Answer,
    Notice(&'static str),
}

impl RenderAs {
    fn for_event(event: &Event) -> Self {
        match event {
            Event::Initialize { .. } | Event::ReviseCode(_) => RenderAs::Assessment,
            Event::RequestMoreSpecific => RenderAs::Hint,
            Event::AskQuestion(_) => RenderAs::Answer,
            Event::UploadImage(_) => RenderAs::Notice("Image loaded. Run /assess to check it."),
            Event::SetProblem(_) => RenderAs::Notice("Problem updated."),
            Event::Reset => RenderAs::Notice("Session reset."),
        }
    }
}

fn render<W: Write>(session: &Session, rendered: RenderAs, out: &mut W) -> Result<()> {
    match rendered {
        RenderAs::Assessment => {
            writeln!(out, "[Code Assessment]\n{}", session.view().assessment_body)?;
            render_hint(session, out)?;
        }
        RenderAs::Hint => render_hint(session, out)?,
        RenderAs::Answer => {
            let answer = session.view().last_answer.unwrap_or_default();
            writeln!(out, "[Coach Answer]\n{}", answer)?;
        }
        RenderAs::Notice(text) => writeln!(out, "{}", text)?,
    }
    Ok(())
}

fn render_hint<W: Write>(session: &Session, out: &mut W) -> Result<()> {
    if !session.is_initialized() {
        writeln!(out, "Load an image with /image and run /assess to start.")?;
        return Ok(());
    }
    let view = session.view();
    writeln!(out, "[Coach Hint] (level={})\n{}", view.level, view.current_hint)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::gateway::stub::ScriptedGateway;
    use crate::coach::image::sample_png;

    const OUTPUT: &str = "[ASSESSMENT]\nThe sum starts at 1.\n[HINTS]\n1) Look at the start\n2) Check the first block\n3) Set sum to 0";

    async fn run_script(gateway: &ScriptedGateway, session: Session, script: &str) -> String {
        let mut out = Vec::new();
        run(gateway, session, script.as_bytes(), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    async fn session_with_image(gateway: &ScriptedGateway) -> Session {
        Session::default()
            .handle(gateway, Event::UploadImage(sample_png()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_assess_then_more() {
        let gateway = ScriptedGateway::with_responses([OUTPUT]);
        let session = session_with_image(&gateway).await;

        let out = run_script(&gateway, session, "/assess\n/more\n/quit\n").await;

        assert!(out.contains("[Code Assessment]\nThe sum starts at 1."));
        assert!(out.contains("[Coach Hint] (level=1)\nLook at the start"));
        assert!(out.contains("[Coach Hint] (level=2)\nCheck the first block"));
    }

    #[tokio::test]
    async fn test_revise_reads_until_terminator() {
        let gateway = ScriptedGateway::with_responses([OUTPUT, OUTPUT]);
        let session = session_with_image(&gateway).await;

        run_script(
            &gateway,
            session,
            "/assess\n/revise\nset sum to 0\nrepeat 10\n.\n",
        )
        .await;

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1]
            .prompt
            .contains("[CURRENT STUDENT CODE - TEXT]\nset sum to 0\nrepeat 10"));
    }

    #[tokio::test]
    async fn test_unterminated_revision_is_not_submitted() {
        let gateway = ScriptedGateway::with_responses([OUTPUT]);
        let session = session_with_image(&gateway).await;

        let out = run_script(&gateway, session, "/assess\n/revise\nset sum to 0\n").await;

        assert!(out.contains("revision not terminated"));
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_reported_and_loop_continues() {
        let gateway = ScriptedGateway::new();
        let out = run_script(&gateway, Session::default(), "why?\n/bogus\n/help\n").await;

        assert!(out.contains("error: Session not initialized"));
        assert!(out.contains("unknown command /bogus"));
        assert!(out.contains("Commands:"));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_question_prints_answer() {
        let gateway = ScriptedGateway::with_responses([OUTPUT, "Try printing the sum each step."]);
        let session = session_with_image(&gateway).await;

        let out = run_script(&gateway, session, "/assess\nhow can I debug?\n").await;
        assert!(out.contains("[Coach Answer]\nTry printing the sum each step."));
    }

    #[tokio::test]
    async fn test_state_prints_json() {
        let gateway = ScriptedGateway::new();
        let out = run_script(&gateway, Session::default(), "/state\n").await;
        assert!(out.contains("\"initialized\": false"));
        assert!(out.contains("\"level\": 1"));
    }
}
