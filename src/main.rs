//! Exam Cram Buddy - 命令行入口
//!
//! 初始化日志、加载配置、获取 API Key（环境变量 > 配置 > 交互输入），然后进入逐行对话循环。
//! 命令：/reset 重新开始，/history 输出记录 JSON，/quit 退出；输入 exit / quit / finish 生成成绩单。

use std::io::Write;

use anyhow::Context;
use cram::agent::create_controller;
use cram::config::{load_config, resolve_api_key, AppConfig};
use cram::core::{CramError, TurnOutcome};
use cram::session::SessionStore;
use tokio::io::{AsyncBufReadExt, BufReader};

const LOCAL_SESSION: &str = "local";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cram::observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    println!("🎓 Agent Exam Cram");
    println!("Your strict but helpful AI University Tutor\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let api_key = match resolve_api_key(&cfg) {
        Some(key) => key,
        None => {
            prompt(&api_key_prompt(&cfg.llm.api_key_env))?;
            lines
                .next_line()
                .await
                .context("Failed to read API key")?
                .map(|k| k.trim().to_string())
                .unwrap_or_default()
        }
    };
    if api_key.is_empty() {
        eprintln!("Please enter your Google API Key to start.");
        return Err(CramError::MissingCredential.into());
    }

    let controller = create_controller(&cfg, &api_key).context("Failed to create tutor")?;
    let store = SessionStore::new(cfg.session.idle_timeout_secs);
    let session = store.get_or_create(LOCAL_SESSION).await;

    {
        let mut guard = session.lock().await;
        match controller.ensure_started(&mut guard).await {
            Ok(()) => print_last_agent_message(&guard),
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    loop {
        prompt("you> ")?;
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut guard = session.lock().await;
        match input {
            "/quit" => break,
            "/reset" => match controller.reset(&mut guard).await {
                Ok(()) => print_last_agent_message(&guard),
                Err(e) => eprintln!("Error: {e}"),
            },
            "/history" => {
                let json = serde_json::to_string_pretty(&guard.view())
                    .context("Failed to render history")?;
                println!("{json}");
            }
            _ => match controller.submit(&mut guard, input).await {
                Ok(TurnOutcome::Reply(reply)) => println!("tutor> {reply}\n"),
                Ok(TurnOutcome::Report(card)) => {
                    println!("### 🎓 Final Report Card\n");
                    println!("{}\n", card.text);
                    if let Some(grade) = card.grade {
                        println!("Grade: {grade}");
                    }
                    println!("Session finished. Type /reset to start again or /quit to leave.");
                }
                Err(e) => eprintln!("Error: {e}"),
            },
        }
    }

    Ok(())
}

fn prompt(text: &str) -> anyhow::Result<()> {
    print!("{text}");
    std::io::stdout().flush().context("Failed to flush stdout")
}

/// 终端输入不隐藏，提示用户改用环境变量
fn api_key_prompt(env_var: &str) -> String {
    format!("Enter Gemini API Key (input is visible; set {env_var} to avoid typing it): ")
}

fn print_last_agent_message(session: &cram::session::TutorSession) {
    if let Some(msg) = session.transcript().last() {
        println!("tutor> {}\n", msg.content());
    }
}
