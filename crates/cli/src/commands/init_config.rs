//! `skywatch init-config`: print a default config file.

use skywatch_config::AppConfig;

pub fn run() {
    println!(
        "# SkyWatch configuration\n# Save as {}\n",
        AppConfig::config_dir().join("config.toml").display()
    );
    println!("{}", AppConfig::default_toml());
}
