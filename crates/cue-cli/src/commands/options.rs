use cue_core::{builtin_options, Session};

/// Print the option catalog and the models each output kind can use.
pub fn run(session: &Session) {
    println!("Options (trigger: {}):", session.trigger().token());
    for option in builtin_options() {
        let kind = option
            .output_kind()
            .map(|k| format!("{k:?}").to_lowercase())
            .unwrap_or_else(|| "local".to_string());
        println!("  {:<20} {:<28} {kind}", option.id, option.display_name);
    }

    println!();
    println!("Models:");
    for model in session.models().all() {
        let endpoint = model.endpoint.as_deref().unwrap_or("default endpoint");
        println!(
            "  {:<24} {:<18} {:<6} {endpoint}",
            model.name,
            model.label(),
            format!("{:?}", model.kind).to_lowercase()
        );
    }
}
