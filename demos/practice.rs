use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pronounce_rs::{
    history::{History, JsonFileStore},
    live::{LiveAnalysisLoop, LiveParamsBuilder, SharedTranscript},
    scoring::{AlignmentKind, AnalyzerParams, SessionAnalyzer},
    speech::{LogSpeechOutput, SpeechOutput, SpeechRequestBuilder},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let target = "Nice to meet you";
    let analyzer = Arc::new(SessionAnalyzer::with_params(AnalyzerParams {
        dictionary_path: None,
        alignment: AlignmentKind::Positional,
    })?);

    let mut speech = LogSpeechOutput;
    speech.speak(
        &SpeechRequestBuilder::default()
            .text(target)
            .rate(0.8)
            .build()?,
    );

    let analyze_start = Instant::now();
    let result = analyzer.analyze("nice meet you", target);
    println!("Analyzed in {:.2?}", analyze_start.elapsed());
    for word in &result.word_breakdown {
        println!(
            "  {:>8} /{}/  heard {:?}: {} ({})",
            word.word, word.expected, word.spoken, word.score, word.feedback
        );
    }
    println!("Positional score: {}", result.overall_score);

    let sequence = SessionAnalyzer::with_params(AnalyzerParams {
        alignment: AlignmentKind::Sequence,
        ..Default::default()
    })?;
    println!(
        "Sequence-aligned score: {}",
        sequence.score("nice meet you", target)
    );

    // Simulated recognizer feeding a growing transcript into a live session.
    let transcript = SharedTranscript::new();
    let history = History::new(Box::new(JsonFileStore::new(PathBuf::from(
        "practice-history.json",
    ))));
    let mut live = LiveAnalysisLoop::with_params(
        analyzer,
        Arc::new(transcript.clone()),
        history,
        LiveParamsBuilder::default()
            .tick_interval(Duration::from_millis(250))
            .build()?,
    );
    live.on_score(|score| println!("  running score: {score}"));

    live.start(target)?;
    for partial in ["nice", "nice to", "nice to meat", "nice to meet you"] {
        transcript.set(partial);
        thread::sleep(Duration::from_millis(300));
    }
    let recorded = live.finish()?;

    println!(
        "Final score {}: {}",
        recorded.result.overall_score, recorded.result.feedback
    );
    for suggestion in &recorded.result.suggestions {
        println!("  - {suggestion}");
    }
    if let Some(e) = &recorded.persist_error {
        println!("Result not saved: {e}");
    } else {
        println!(
            "History now holds {} results",
            live.history().entries()?.len()
        );
    }

    Ok(())
}
