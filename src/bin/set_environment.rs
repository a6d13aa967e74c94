use clap::Parser;
use simp_utils::utils::logger;
use simp_utils::{ClassifierCliConfig, YamlNodeClassifier};

fn main() {
    let config = ClassifierCliConfig::parse();

    logger::init_cli_logger(config.verbose);

    let classifier = YamlNodeClassifier::with_format(config.output_format());
    match classifier.run(config.hostnames.as_slice(), &config.config) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            tracing::error!(
                "Classification failed: {} (Category: {:?})",
                e,
                e.category()
            );
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
