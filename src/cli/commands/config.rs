use crate::Context;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::sync::endpoint::{BUILD_SYNC_URL, Endpoint, SetUrl, apply_url};
use crate::ui::messages::{info, success, warning};

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, ctx: &mut Context) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        set_url,
        show_url,
    } = cmd
    {
        // ---- SET URL ----
        if let Some(url) = set_url {
            match apply_url(&mut ctx.cfg, url, BUILD_SYNC_URL) {
                SetUrl::Stored(u) => {
                    ctx.cfg.save()?;
                    success(format!("Sync URL set to {u}"));
                }
                SetUrl::Cleared => {
                    ctx.cfg.save()?;
                    success("Sync URL cleared.");
                }
                SetUrl::IgnoredFixed => {
                    warning("The sync URL is fixed in this build; the setting was ignored.");
                }
            }
        }

        // ---- SHOW URL ----
        if *show_url {
            let endpoint = Endpoint::from_config(&ctx.cfg);
            match endpoint.resolve() {
                Ok(url) if endpoint.is_fixed() => println!("{url} (fixed at build time)"),
                Ok(url) => println!("{url}"),
                Err(_) => info("No sync URL configured."),
            }
        }

        // ---- PRINT CONFIG ----
        if *print_config {
            println!("📄 {}\n", Config::config_file().display());
            print!("{}", serde_yaml::to_string(&ctx.cfg)?);
        }
    }

    Ok(())
}
