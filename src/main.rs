// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Demo binary: declares a small research ensemble against the scripted
//! backend and runs it through a scope.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use ensemble::collaborators::ScriptedLlm;
use ensemble::config::Settings;
use ensemble::lifecycle::App;
use ensemble::registry::ExecutionMetadata;
use ensemble::workflows::QualityRating;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = match Settings::find_config() {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.logger.level.clone())),
        )
        .init();

    let plan = r#"{"steps":[
        {"description":"research","tasks":[
            {"agent":"report", "objective":"summarize and versify the topic"}]},
        {"description":"polish","tasks":[
            {"agent":"polished-writer", "objective":"produce the final text"}]}
    ]}"#;
    let llm = Arc::new(
        ScriptedLlm::new("A short note on the topic.")
            .respond_when("Produce a JSON plan", plan)
            .respond_when("Rate the candidate", "GOOD, ship it")
            .respond_when("Synthesize a final answer", "Final research report."),
    );

    let mut app = App::new("ensemble-demo", settings, llm);
    app.declare_basic("poet", "Write a short poem about the input.")?;
    app.declare_basic("summarizer", "Summarize the input in two sentences.")?;
    app.declare_basic("collector", "Merge the sections into one coherent text.")?;
    app.declare_parallel(
        "report",
        "collector",
        vec!["poet".to_string(), "summarizer".to_string()],
    )?;
    app.declare_basic("writer", "Draft prose from the material you are given.")?;
    app.declare_basic(
        "critic",
        "Rate drafts as POOR, FAIR, GOOD or EXCELLENT with feedback.",
    )?;
    app.declare_evaluator_optimizer(
        "polished-writer",
        "writer",
        "critic",
        QualityRating::Good,
        3,
    )?;
    app.declare_orchestrator(
        "lead",
        "Coordinate research and writing.",
        vec!["report".to_string(), "polished-writer".to_string()],
    )?;
    app.register_task(
        ExecutionMetadata::new("word-count"),
        Arc::new(|input: String| {
            Box::pin(async move { Ok(input.split_whitespace().count().to_string()) })
        }),
    )?;

    let scope = app.run_scope();
    let answer = scope.invoke("lead", "the history of sourdough").await?;
    println!("{answer}");

    let words = scope.run_task("word-count", answer).await?;
    println!("({words} words)");

    scope.shutdown();
    Ok(())
}
