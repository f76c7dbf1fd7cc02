use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use std::rc::Rc;

use chrononotes::auth::{LocalAuth, SessionProvider};
use chrononotes::cli::{self, Cli, CliError, Commands};
use chrononotes::{Config, Database, Profile, Workspace, logging, utils};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let data_dir = utils::get_data_dir(profile)
        .ok_or_else(|| eyre!("Could not determine the data directory"))?;
    logging::init(&data_dir)?;

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(&utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };

    let db = Rc::new(Database::new(&config.get_database_path(profile))?);
    let mut auth = LocalAuth::new(Rc::clone(&db), data_dir.join("session.json"))?;
    let today = utils::today();
    let mut out = std::io::stdout().lock();

    tracing::info!(?profile, "starting");

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            drop(out);
            let app = chrononotes::tui::App::new(config, db, auth, today)?;
            chrononotes::tui::run_event_loop(app)?;
        }
        Commands::Signup { name, email, password } => {
            cli::handle_signup(&mut auth, &name, &email, &password, &mut out)?;
        }
        Commands::Signin { email, password } => {
            cli::handle_signin(&mut auth, &email, &password, &mut out)?;
        }
        Commands::Signout => cli::handle_signout(&mut auth, &mut out)?,
        Commands::Whoami => cli::handle_whoami(&auth, &mut out)?,
        command => {
            let user = auth.current_user().cloned().ok_or(CliError::NotSignedIn)?;
            let mut workspace = Workspace::open(Rc::clone(&db), user, today)?;
            match command {
                Commands::AddTask { title, description, due, priority, list, tags } => {
                    cli::handle_add_task(
                        &mut workspace,
                        &title,
                        description.as_deref(),
                        due.as_deref(),
                        priority,
                        list.as_deref(),
                        tags.as_deref(),
                        &mut out,
                    )?;
                }
                Commands::AddNote { title, content, folder, tags } => {
                    cli::handle_add_note(
                        &mut workspace,
                        &title,
                        content.as_deref(),
                        folder.as_deref(),
                        tags.as_deref(),
                        &mut out,
                    )?;
                }
                Commands::AddList { name } => cli::handle_add_list(&mut workspace, &name, &mut out)?,
                Commands::Tasks { filter, list, search, stats } => {
                    cli::handle_tasks(&mut workspace, filter, &list, search.as_deref(), stats, &mut out)?;
                }
                Commands::ShowNote { title, html } => {
                    cli::handle_show_note(&workspace, &title, html, &mut out)?;
                }
                Commands::Tui | Commands::Signup { .. } | Commands::Signin { .. } | Commands::Signout | Commands::Whoami => {}
            }
        }
    }

    Ok(())
}
