//! `nohandcoder chat` — interactive conversation.
//!
//! Each input line is one turn. Ctrl+C cancels the turn in progress and
//! returns to the prompt with history unchanged.

use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{build_session, load_config, render_event, report_turn_error};

/// What a line of user input asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Exit,
    Reset,
    Message(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Empty,
        "exit" | "quit" => Input::Exit,
        "/reset" => Input::Reset,
        text => Input::Message(text),
    }
}

/// Cancel `token` on the next Ctrl+C. Abort the handle once the turn ends.
pub(crate) fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

pub async fn run(workspace: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(workspace)?;
    let mut session = build_session(&config)?;

    println!();
    println!("  NoHandCoder — interactive mode");
    println!();
    println!("  Model:      {}", config.model);
    println!("  Workspace:  {}", config.workspace_root().display());
    println!("  Tools:      analyzeProject, searchFiles, readFile, editFile, executeCommand");
    println!();
    println!("  Type your message and press Enter.");
    println!("  '/reset' clears the conversation, 'exit' or 'quit' leaves.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match classify(&line) {
            Input::Empty => {}
            Input::Exit => break,
            Input::Reset => {
                session.reset();
                println!("  Conversation cleared.");
            }
            Input::Message(text) => {
                println!();
                let cancel = CancellationToken::new();
                let watcher = cancel_on_ctrl_c(cancel.clone());

                if let Err(e) = session
                    .handle_user_input_with_cancel(text, Some(&render_event), &cancel)
                    .await
                {
                    println!();
                    report_turn_error(&e);
                }
                watcher.abort();
                println!();
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}
