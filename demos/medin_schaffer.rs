//! # Medin & Schaffer (1978) replication
//!
//! Trains the model on the six labelled items of experiment 1, prints the
//! category structure it discovers, then predicts the category label of the
//! twelve test items with the label dimension held out.
//!
//! ```bash
//! RUST_LOG=rmc_core=debug cargo run --example medin_schaffer
//! ```

use rmc_core::medin;
use rmc_core::{Assigner, Coupling, Predictor};
use tracing_subscriber::EnvFilter;

// ── Output helpers ───────────────────────────────────────────────────────────

fn bits(values: &[usize]) -> String {
    values.iter().map(|v| v.to_string()).collect()
}

fn bar(p: f64) -> String {
    let filled = (p * 30.0).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(30usize.saturating_sub(filled)))
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> rmc_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let space = medin::feature_space()?;
    let mut model = Assigner::new(space, Coupling::new(medin::TRAINING_COUPLING)?);

    println!("Training (c = {})", medin::TRAINING_COUPLING);
    println!("──────────────────────────────────────────");
    for assignment in model.train(medin::training_set())? {
        let values = model
            .store()
            .stimulus(assignment.stimulus_index)
            .map(|s| bits(s.values()))
            .unwrap_or_default();
        println!(
            "  item {}  {}  → category {}{}  (posterior {:.3})",
            assignment.stimulus_index,
            values,
            assignment.category,
            if assignment.created { " (new)" } else { "" },
            assignment.posterior,
        );
    }

    println!();
    println!("Categories");
    println!("──────────────────────────────────────────");
    for id in model.store().category_ids() {
        let members: Vec<String> = model
            .store()
            .stimuli_in(id)?
            .map(|s| bits(s.values()))
            .collect();
        println!("  {id}: {}", members.join(" "));
    }

    let coupling = Coupling::new(medin::TEST_COUPLING)?;
    let predictor = Predictor::new(model.store(), coupling);

    println!();
    println!("Test: P(category A) with the label held out (c = {})", medin::TEST_COUPLING);
    println!("──────────────────────────────────────────");
    for (cue, label) in medin::test_cues().iter().zip(medin::TEST_LABELS) {
        let prediction = predictor.predict(medin::LABEL_DIMENSION, cue)?;
        let a = prediction.probability(1);
        println!(
            "  {label}  {a:.3}  {}  (novel mass {:.3})",
            bar(a),
            prediction.novel_mass
        );
    }

    Ok(())
}
