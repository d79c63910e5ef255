//! Scripted call simulator.
//!
//! Drives a canned conversation through the engine and prints the
//! transcript plus the final summary. Pick a scenario with the first
//! argument: `outbound` (default), `missed`, or `inbound`.
//!
//! ```sh
//! cargo run -p afterhours-agent --example simulate_call -- missed
//! ```

use std::collections::HashMap;

use afterhours_agent::CallEngine;
use afterhours_config::AgentSettings;
use afterhours_core::CallType;

fn scenario(name: &str) -> (CallType, Vec<&'static str>) {
    match name {
        "missed" => (
            CallType::Missed,
            vec![
                "I'm in Irvine, my AC stopped and the house is getting hot.",
                "Pretty urgent. No AC tonight and we've got kids in the house.",
                "Tomorrow 9 to 11am is best. Texting is fine if you can't reach me.",
                "Jake",
            ],
        ),
        "inbound" => (
            CallType::Inbound,
            vec![
                "Hi, I need a quote for a new install.",
                "We're a plumbing company and we miss calls after 6pm.",
                "owner@pipeworks.example.com",
            ],
        ),
        _ => (
            CallType::Outbound,
            vec![
                "Yes, now is fine",
                "We're a small law firm, just me and two paralegals",
                "We handle client intake manually, lots of email back and forth",
                "Yes, I'm the owner and decision maker",
                "Probably next quarter, we're pretty busy right now",
                "Yes, that works",
            ],
        ),
    }
}

fn main() {
    let name = std::env::args().nth(1).unwrap_or_else(|| "outbound".to_string());
    let (call_type, script) = scenario(&name);

    let engine = CallEngine::new(AgentSettings::default());
    let call_id = "sim_call_1";
    let initial = HashMap::from([
        ("business_name".to_string(), "Smith Legal Services".to_string()),
        ("contact_name".to_string(), "John Smith".to_string()),
    ]);

    engine
        .start_call(call_id, call_type, Some(&initial))
        .expect("fresh engine has no active calls");

    println!("=== {call_type} call simulation ===\n");
    if let Some(prompt) = engine.initial_prompt(call_id) {
        println!("Agent: {prompt}");
    }

    for line in script {
        println!("\nCaller: {line}");
        let result = engine.process_user_input(call_id, line);
        println!("Agent: {}", result.prompt);
        if result.should_end || result.should_transfer {
            break;
        }
    }

    if let Some(summary) = engine.end_call(call_id) {
        println!("\n=== Call summary ===");
        println!("Final state: {}", summary.final_state);
        println!(
            "Completeness: {:.2} ({}/{})",
            summary.data_completeness.score,
            summary.data_completeness.collected,
            summary.data_completeness.total_required
        );
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).expect("summary serializes")
        );
    }
}
