//! `botloom ask` and `botloom stream`.

use std::io::Write;

use botloom_agent::STREAM_APOLOGY;

use super::{build_pipeline, RequestArgs};

pub async fn run(args: RequestArgs, json: bool) -> anyhow::Result<()> {
    let orchestrator = build_pipeline(&args.knowledge).await?;
    let response = orchestrator.process_request(&args.to_request()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{}", response.text);
    println!();
    println!("  Model:       {}", response.model);
    println!("  Confidence:  {:.2}", response.confidence);
    println!("  Tokens:      {}", response.tokens_used);
    println!("  Time:        {} ms", response.processing_time_ms);
    if !response.sources.is_empty() {
        println!("  Sources:     {}", response.sources.join(", "));
    }
    for action in &response.actions {
        let confirm = if action.requires_confirmation {
            " (needs confirmation)"
        } else {
            ""
        };
        println!("  Action:      {}{confirm}", action.action_type);
    }

    Ok(())
}

pub async fn stream(args: RequestArgs) -> anyhow::Result<()> {
    let orchestrator = build_pipeline(&args.knowledge).await?;
    let mut stdout = std::io::stdout();

    let response = orchestrator
        .process_streaming_request(&args.to_request(), |chunk| {
            print!("{chunk}");
            let _ = stdout.flush();
        })
        .await;
    println!();

    if response.is_none() {
        anyhow::bail!("{STREAM_APOLOGY}");
    }
    Ok(())
}
