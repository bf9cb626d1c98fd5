use crate::e2e::helpers::{coordinator, fixtures, pipeline_config, ScriptedClient, TestContext};

use std::sync::Arc;
use texttape::domain::pipeline::{PipelineServiceApi, RunSummary};
use texttape::domain::segment::segment;
use texttape::domain::text::{clean_for_speech, CleaningOptions};
use texttape::infrastructure::storage::{read_document, write_audio, write_summary};
use uuid::Uuid;

#[tokio::test]
async fn it_should_turn_an_html_file_into_audio_and_summary() {
    let ctx = TestContext::new();
    let input = ctx.write_input("chapter.html", fixtures::HTML_ARTICLE);
    let output = ctx.path("out/chapter.mp3");
    let summary_path = ctx.path("out/chapter.mp3.report.json");

    let raw = read_document(&input).await.unwrap();
    let document = clean_for_speech(&raw, CleaningOptions::default());
    assert!(!document.contains('<'));
    assert!(!document.contains("https://"));

    let chunks = segment(&document, 60).unwrap();
    let last_chunk = chunks.last().unwrap();
    assert!(last_chunk.text.ends_with("thirteen!"));
    let client = Arc::new(ScriptedClient::new().failing(&last_chunk.text));
    let report = coordinator(client.clone(), pipeline_config(60))
        .run(&document)
        .await
        .unwrap();

    let run_id = Uuid::new_v4();
    write_audio(&output, &report.output.as_ref().unwrap().bytes)
        .await
        .unwrap();
    write_summary(&summary_path, &report.summary(run_id))
        .await
        .unwrap();

    let audio = std::fs::read(&output).unwrap();
    assert!(!audio.is_empty());
    assert!(String::from_utf8_lossy(&audio).contains("bright cold day"));

    let summary: RunSummary =
        serde_json::from_slice(&std::fs::read(&summary_path).unwrap()).unwrap();
    assert_eq!(summary.run_id, run_id);
    assert_eq!(summary.total_chunks, report.total_chunks);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].index, report.total_chunks - 1);
    assert!(summary.output.is_some());
}

#[tokio::test]
async fn it_should_fail_to_read_a_missing_input() {
    let ctx = TestContext::new();
    assert!(read_document(&ctx.path("nope.txt")).await.is_err());
}
