//! Keygen command - prints new API key secrets

use clap::Args;

use crate::infrastructure::api_key::{ApiKeyGenerator, DEFAULT_KEY_PREFIX};

#[derive(Args, Debug, Clone)]
pub struct KeygenArgs {
    /// Prefix prepended to each secret
    #[arg(long, default_value = DEFAULT_KEY_PREFIX)]
    pub prefix: String,

    /// Number of secrets to generate
    #[arg(long, default_value_t = 1)]
    pub count: usize,
}

/// Generate the requested secrets
pub fn generate(args: &KeygenArgs) -> Vec<String> {
    let generator = ApiKeyGenerator::new(args.prefix.clone());
    (0..args.count).map(|_| generator.generate()).collect()
}

/// Print secrets, one per line
pub fn run(args: KeygenArgs) -> anyhow::Result<()> {
    for secret in generate(&args) {
        println!("{}", secret);
    }
    Ok(())
}
