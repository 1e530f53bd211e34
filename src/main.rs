use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use riot_match_table::aggregate::PlayerIdentity;
use riot_match_table::config::{Config, Platform};
use riot_match_table::export;
use riot_match_table::pipeline::build_match_table;
use riot_match_table::reference::MatchReference;
use riot_match_table::riot_api::RiotClient;
use riot_match_table::sources::{LocalMatchStore, MatchHistorySource, PlayerIdentitySource};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "riot-match-table",
    about = "Per-match League of Legends stats for one player",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the PUUID of a Riot ID
    Puuid {
        #[command(flatten)]
        player: PlayerArgs,
    },
    /// Save raw match JSON for later offline use
    Download {
        #[command(flatten)]
        player: PlayerArgs,
        #[arg(long = "out-dir", default_value = "matches")]
        out_dir: PathBuf,
    },
    /// Build the per-match stats table
    Table {
        #[command(flatten)]
        player: PlayerArgs,
        /// Read matches saved by `download` instead of calling the API
        #[arg(long = "from-dir")]
        from_dir: Option<PathBuf>,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        parquet: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct PlayerArgs {
    /// Riot game name (e.g., Summoner name)
    #[arg(long = "game-name")]
    game_name: Option<String>,

    /// Riot tag line (e.g., region tag)
    #[arg(long = "tag-line")]
    tag_line: Option<String>,

    /// Skip the account lookup and use this PUUID
    #[arg(long)]
    puuid: Option<String>,

    #[arg(long)]
    platform: Option<Platform>,

    /// Number of most recent matches
    #[arg(long)]
    count: Option<usize>,

    /// Queue id filter; 0 lists every queue
    #[arg(long)]
    queue: Option<u16>,
}

impl PlayerArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(platform) = self.platform {
            config.platform = platform;
        }
        if let Some(count) = self.count {
            config.set_match_count(count);
        }
        if let Some(queue) = self.queue {
            config.queue = (queue != 0).then_some(queue);
        }
    }

    fn riot_id(&self) -> Result<(&str, &str)> {
        match (self.game_name.as_deref(), self.tag_line.as_deref()) {
            (Some(name), Some(tag)) => Ok((name, tag)),
            _ => bail!("either --puuid or both --game-name and --tag-line are required"),
        }
    }
}

fn client(config: &Config) -> Result<RiotClient> {
    Ok(RiotClient::new(config.api_key()?, config.platform, config.queue)?)
}

fn identity(player: &PlayerArgs, config: &Config) -> Result<PlayerIdentity> {
    if let Some(puuid) = &player.puuid {
        return Ok(PlayerIdentity::from_puuid(puuid.clone()));
    }
    let (game_name, tag_line) = player.riot_id()?;
    client(config)?
        .resolve_player(game_name, tag_line)
        .with_context(|| format!("resolving {}#{}", game_name, tag_line))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Command::Puuid { player } => {
            player.apply(&mut config);
            let identity = identity(&player, &config)?;
            println!("{}", identity.puuid);
        }
        Command::Download { player, out_dir } => {
            player.apply(&mut config);
            let identity = identity(&player, &config)?;
            let client = client(&config)?;
            let store = LocalMatchStore::new(out_dir);

            let references = client.match_references(&identity, config.match_count)?;
            let total = references.len();
            let mut saved = 0;

            for (idx, raw) in references.iter().enumerate() {
                let match_id = match MatchReference::from_value(raw).resolve() {
                    Ok(id) => id,
                    Err(err) => {
                        log::warn!("Skipping match {}/{}: {}", idx + 1, total, err);
                        continue;
                    }
                };

                log::info!("Downloading match {}/{}: {}", idx + 1, total, match_id);
                let result = client
                    .get_match_json(&match_id)
                    .map_err(anyhow::Error::from)
                    .and_then(|json| store.save(&match_id, &json));
                match result {
                    Ok(_) => saved += 1,
                    Err(err) => log::warn!("Failed to save match {}: {:#}", match_id, err),
                }
            }

            println!("Saved {}/{} matches to {}", saved, total, store.dir().display());
        }
        Command::Table {
            player,
            from_dir,
            csv,
            parquet,
        } => {
            player.apply(&mut config);
            let identity = identity(&player, &config)?;

            let report = match from_dir {
                Some(dir) => {
                    let store = LocalMatchStore::new(dir);
                    build_match_table(&store, &store, &identity, config.match_count)?
                }
                None => {
                    let client = client(&config)?;
                    build_match_table(&client, &client, &identity, config.match_count)?
                }
            };

            let table = &report.table;
            println!("{}", table.to_dataframe()?);

            let summary = table.summary();
            println!(
                "{} matches: {} wins, {} losses, win rate {}, average KDA {}",
                summary.matches,
                summary.wins,
                summary.losses,
                summary
                    .win_rate
                    .map(|rate| format!("{:.1}%", rate * 100.0))
                    .unwrap_or_else(|| "-".to_string()),
                summary
                    .average_kda
                    .map(|kda| format!("{:.2}", kda))
                    .unwrap_or_else(|| "-".to_string()),
            );

            for diagnostic in &report.diagnostics {
                let position = diagnostic
                    .position
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "history".to_string());
                eprintln!(
                    "skipped [{}] {}: {}",
                    position, diagnostic.reference, diagnostic.reason
                );
            }

            if let Some(path) = csv {
                export::write_csv(table, &path)?;
                log::info!("Wrote {}", path.display());
            }
            if let Some(path) = parquet {
                export::write_parquet(table, &path)?;
                log::info!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}
