use clap::Parser;
use simp_utils::utils::{logger, validation::Validate};
use simp_utils::{EtlEngine, LdifRemapPipeline, LocalStorage, RemapCliConfig, RemapProfile, SimpError};

fn main() {
    let config = RemapCliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    let profile = match load_profile(&config) {
        Ok(profile) => profile,
        Err(e) => fail(e),
    };

    let storage = LocalStorage::default();
    let pipeline = LdifRemapPipeline::with_profile(storage, config.clone(), profile);
    let engine = EtlEngine::new(pipeline);

    match engine.run() {
        Ok(summary) => {
            println!("Input File:  {}", config.input_path.trim());
            println!("Output File: {}", summary.output_path);
            println!("Base DN:     {}", summary.base_dn);
        }
        Err(e) => fail(e),
    }
}

fn load_profile(config: &RemapCliConfig) -> simp_utils::Result<RemapProfile> {
    config.validate()?;

    let profile = match &config.profile {
        Some(path) => {
            tracing::info!("Loading conversion profile from: {}", path);
            RemapProfile::from_file(path)?
        }
        None => RemapProfile::default(),
    };
    profile.validate()?;
    Ok(profile)
}

fn fail(e: SimpError) -> ! {
    tracing::error!(
        "Conversion failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("{}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
