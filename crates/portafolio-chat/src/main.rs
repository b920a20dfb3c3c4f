use anyhow::Result;
use clap::Parser;
use colored::*;
use portafolio_core::i18n::{DetectionContext, LocaleStore, MemoryLocaleStore, Params};
use portafolio_core::{
    CancelToken, Catalog, ChatSession, Config, ConfigLocaleStore, I18nState, SubmitOutcome,
};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portafolio-chat")]
#[command(about = "Chat with the portfolio assistant from the terminal")]
struct Cli {
    /// Base URL of the portfolio server
    #[arg(short, long)]
    server: Option<String>,
    /// Language to use (es, en); remembered for next time
    #[arg(short, long)]
    locale: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();
    let server_url = cli
        .server
        .unwrap_or_else(|| config.server_url().to_string());

    // Without a config directory the choice just isn't remembered
    let store: Box<dyn LocaleStore> = match ConfigLocaleStore::user() {
        Ok(store) => Box::new(store),
        Err(e) => {
            debug!(error = %e, "locale will not be persisted");
            Box::new(MemoryLocaleStore::default())
        }
    };

    let mut i18n = I18nState::new(Arc::new(Catalog::embedded()?))
        .hydrate(&DetectionContext::interactive(store.as_ref()));
    if let Some(code) = cli.locale.as_deref() {
        i18n = i18n.set_locale_code(code, Some(store.as_ref()));
    }

    let mut session = ChatSession::new(&server_url, i18n);
    print_banner(session.i18n());
    run(&mut session).await?;

    println!("{}", session.i18n().t("chat.goodbye").dimmed());
    Ok(())
}

fn print_banner(i18n: &I18nState) {
    let language = Params::new().with("language", i18n.locale().display_name());
    println!("\n{}", i18n.t("chat.terminalTitle").bold().green());
    println!("{}", i18n.t_with("chat.language", &language).dimmed());
    println!("\n{}", i18n.t("chat.welcome"));
    println!("{}\n", i18n.t("chat.welcomeHint").dimmed());
}

/// Read-send-render loop. Ctrl-C or end of input closes the chat; during a
/// reply it also stops rendering whatever is still streaming.
async fn run(session: &mut ChatSession) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "›".bold().cyan());
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            return Ok(());
        };

        let thinking = session.i18n().t("chat.thinking");
        let mut started = false;
        let interrupt = async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        let outcome = submit_until(session, &line, interrupt, |chunk| {
            if !started {
                started = true;
                println!("{}", thinking.dimmed());
            }
            print!("{}", chunk);
            let _ = std::io::stdout().flush();
        })
        .await;

        match outcome {
            SubmitOutcome::Ignored => {}
            SubmitOutcome::Cleared => {
                println!("{}\n", session.i18n().t("chat.cleared").dimmed())
            }
            SubmitOutcome::Replied(_) => println!("\n"),
            SubmitOutcome::Failed => {
                if let Some(message) = session.transcript().last() {
                    println!("{}\n", message.content.red());
                }
            }
            SubmitOutcome::Cancelled => {
                println!("\n{}", session.i18n().t("chat.cancelled").yellow());
                return Ok(());
            }
        }
    }
}

/// Run one send, cancelling it as soon as `interrupt` resolves.
///
/// Both futures are polled from the same task, so an interrupt that lands
/// right after the send starts is still seen.
async fn submit_until<I, F>(
    session: &mut ChatSession,
    input: &str,
    interrupt: I,
    on_chunk: F,
) -> SubmitOutcome
where
    I: Future<Output = ()>,
    F: FnMut(&str),
{
    let cancel = CancelToken::new();
    let submit = session.submit(input, &cancel, on_chunk);
    tokio::pin!(submit, interrupt);
    let mut interrupted = false;

    loop {
        tokio::select! {
            biased;
            _ = &mut interrupt, if !interrupted => {
                interrupted = true;
                cancel.cancel();
            }
            outcome = &mut submit => return outcome,
        }
    }
}
