// SPDX-License-Identifier: MPL-2.0

//! `planner` - command-line front end for the content planner.
//!
//! Every command belongs to a screen and goes through the same redirect
//! policy as the dashboard's router: signed out, only `sign-in`/`sign-up`
//! work; signed in, those two land on the dashboard instead.

use clap::{Args, Parser, Subcommand};
use content_planner::config::{APP_NAME, AppConfig, IS_DEVEL, LOG_ENV};
use content_planner::events::{AppEvent, Topic};
use content_planner::posts::compose::generate_placeholder;
use content_planner::posts::{
    ComposeError, ImageAttachment, Platform, PostId, PostPatch, RepositoryError, ScheduledPost, Tone,
};
use content_planner::state::{Navigation, NotificationKind, Route, UserProfile};
use content_planner::validation::validate_post_content;
use content_planner::views::format_trend;
use content_planner::{App, AppError};
use std::cell::Cell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "planner")]
#[command(author, version, about = "Plan, draft and schedule social posts")]
struct Cli {
    /// Directory holding the local store (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an existing account
    SignIn {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    SignUp {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show session state and the signed-in profile
    Status,
    /// Counts, upcoming posts and recent activity
    Dashboard,
    /// All scheduled posts in chronological order
    Calendar,
    /// Posts due from now on
    Upcoming {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Create, edit or remove scheduled posts
    Post {
        #[command(subcommand)]
        action: PostAction,
    },
    /// Manage the work-in-progress draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Remove every scheduled post and the draft
    ClearAll,
    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Toggle a notification preference (`email`, `ai-suggestions`)
    Notify { kind: NotificationKind },
    /// Simulated engagement numbers
    Analytics,
    /// Print placeholder generated content
    Generate {
        #[command(flatten)]
        style: Style,
    },
    /// Follow changes made by other planner instances
    Watch,
    /// Write the effective configuration to the config file
    SaveConfig,
    /// About this application
    About,
}

#[derive(Args)]
struct Style {
    #[arg(long, default_value = "linkedin")]
    platform: Platform,
    #[arg(long, default_value = "professional")]
    tone: Tone,
}

#[derive(Subcommand)]
enum PostAction {
    /// Schedule a new post
    Create {
        /// Post text; defaults to the saved draft
        content: Option<String>,
        #[command(flatten)]
        style: Style,
        /// Attach an image file
        #[arg(long)]
        image: Option<PathBuf>,
        /// Use placeholder generated content
        #[arg(long)]
        generate: bool,
    },
    /// Edit a scheduled post, keeping its schedule time
    Edit {
        id: PostId,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        platform: Option<Platform>,
        #[arg(long)]
        tone: Option<Tone>,
        #[arg(long, conflicts_with = "remove_image")]
        image: Option<PathBuf>,
        #[arg(long)]
        remove_image: bool,
    },
    /// Delete a scheduled post
    Delete { id: PostId },
    /// Show one scheduled post
    Show { id: PostId },
}

#[derive(Subcommand)]
enum DraftAction {
    /// Save the draft, replacing the previous one
    Save {
        content: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Show,
    Clear,
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Set {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, default_value = "")]
        bio: String,
    },
}

impl Commands {
    /// Screen the command belongs to
    fn route(&self) -> Route {
        match self {
            Commands::SignIn { .. } | Commands::SignUp { .. } => Route::Auth,
            Commands::Logout | Commands::Status | Commands::Dashboard | Commands::ClearAll => {
                Route::Dashboard
            }
            Commands::Watch => Route::Dashboard,
            Commands::Calendar | Commands::Upcoming { .. } => Route::Calendar,
            Commands::Post { .. } | Commands::Draft { .. } | Commands::Generate { .. } => {
                Route::CreatePost
            }
            Commands::Profile { .. } | Commands::Notify { .. } => Route::Settings,
            Commands::Analytics => Route::Analytics,
            Commands::About => Route::About,
            Commands::SaveConfig => Route::Settings,
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| config.log_filter.as_str().into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    init_tracing(&config);

    match run(cli, config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: AppConfig) -> Result<ExitCode, AppError> {
    let app = App::open(config)?;

    let route = cli.command.route();
    match app.navigate(route.path()) {
        Navigation::Render(_) => {}
        Navigation::Redirect(Route::Auth) => {
            eprintln!("Not signed in. Use `planner sign-in` or `planner sign-up` first.");
            return Ok(ExitCode::FAILURE);
        }
        Navigation::Redirect(target) => {
            println!("Already signed in; {target} is where you land.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    match cli.command {
        Commands::SignIn { email, password } => {
            let profile = app.session().sign_in(&email, &password)?;
            println!("Login Successful! Welcome back, {}.", profile.name);
        }
        Commands::SignUp {
            name,
            email,
            password,
        } => {
            let profile = app.session().sign_up(&name, &email, &password)?;
            println!("Signup Successful! Your account has been created, {}.", profile.name);
        }
        Commands::Logout => {
            app.session().logout()?;
            println!("Signed out.");
        }
        Commands::Status => {
            let profile = app.session().profile()?;
            println!("Signed in as {} <{}>", profile.name, profile.email);
            if !profile.bio.is_empty() {
                println!("{}", profile.bio);
            }
        }
        Commands::Dashboard => print_dashboard(&app)?,
        Commands::Calendar => {
            let posts = app.posts().calendar()?;
            if posts.is_empty() {
                println!("No posts scheduled yet.");
            }
            for post in &posts {
                print_post(post);
            }
        }
        Commands::Upcoming { limit } => {
            let limit = limit.unwrap_or(app.config().upcoming_limit);
            let posts = app.posts().upcoming(app.posts().now(), limit)?;
            if posts.is_empty() {
                println!("No upcoming posts.");
            }
            for post in &posts {
                print_post(post);
            }
        }
        Commands::Post { action } => return run_post(&app, action),
        Commands::Draft { action } => return run_draft(&app, action),
        Commands::ClearAll => {
            app.posts().clear_all()?;
            println!("All drafts and scheduled posts have been cleared.");
        }
        Commands::Profile { action } => match action {
            ProfileAction::Show => {
                let profile = app.settings().profile()?;
                println!("Name:  {}", profile.name);
                println!("Email: {}", profile.email);
                println!("Bio:   {}", profile.bio);
                let prefs = app.settings().notifications()?;
                println!("Email notifications: {}", on_off(prefs.email));
                println!("AI suggestions:      {}", on_off(prefs.ai_suggestions));
            }
            ProfileAction::Set { name, email, bio } => {
                app.settings()
                    .save_profile(&UserProfile { name, email, bio })?;
                println!("Profile saved.");
            }
        },
        Commands::Notify { kind } => {
            let enabled = app.settings().toggle(kind)?;
            println!(
                "{kind} notifications {}.",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        Commands::Analytics => {
            let snapshot = app.analytics(&mut rand::rng())?;
            println!(
                "Total reach:     {} ({})",
                snapshot.total_reach,
                format_trend(f64::from(snapshot.reach_trend), "%")
            );
            println!(
                "Engagement rate: {}% ({})",
                snapshot.engagement_rate,
                format_trend(snapshot.engagement_trend, "%")
            );
            println!(
                "Posts published: {} ({})",
                snapshot.posts_published,
                format_trend(f64::from(snapshot.posts_trend), " posts")
            );
        }
        Commands::Generate { style } => {
            println!("{}", generate_placeholder(style.platform, style.tone));
        }
        Commands::Watch => watch(&app)?,
        Commands::SaveConfig => {
            app.config().save()?;
            println!("Configuration saved.");
        }
        Commands::About => {
            let devel = if IS_DEVEL { " (development build)" } else { "" };
            println!("{APP_NAME} {}{devel}", env!("CARGO_PKG_VERSION"));
            println!("Plan, draft and schedule posts for LinkedIn, Twitter and Instagram.");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_post(app: &App, action: PostAction) -> Result<ExitCode, AppError> {
    match action {
        PostAction::Create {
            content,
            style,
            image,
            generate,
        } => {
            let mut composer = app.composer();
            composer.load(None)?;
            composer.set_platform(style.platform);
            composer.set_tone(style.tone);

            if generate {
                composer.generate();
            } else if let Some(content) = content
                && !composer.set_content(content)
            {
                eprintln!("Post content is over the length limit.");
                return Ok(ExitCode::FAILURE);
            }
            if let Some(path) = image {
                composer.attach(ImageAttachment::from_path(&path)?);
            }

            let post = composer.schedule()?;
            println!("Post scheduled (id {}).", post.id);
        }
        PostAction::Edit {
            id,
            content,
            platform,
            tone,
            image,
            remove_image,
        } => {
            let image_preview = match (image, remove_image) {
                (Some(path), _) => Some(Some(ImageAttachment::from_path(&path)?.data_url)),
                (None, true) => Some(None),
                (None, false) => None,
            };

            if let Some(content) = &content {
                validate_post_content(content).map_err(ComposeError::from)?;
            }

            let patch = PostPatch {
                content,
                platform,
                tone,
                image_preview,
            };
            match app.posts().update(id, patch) {
                Ok(post) => {
                    println!("Post updated.");
                    print_post(&post);
                }
                Err(RepositoryError::NotFound(_)) => {
                    eprintln!("Could not find post to edit.");
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            }
        }
        PostAction::Delete { id } => {
            if app.posts().delete(id)? {
                println!("The scheduled post has been removed.");
            } else {
                eprintln!("No scheduled post with id {id}.");
            }
        }
        PostAction::Show { id } => match app.posts().get(id)? {
            Some(post) => print_post(&post),
            None => {
                eprintln!("No scheduled post with id {id}.");
                return Ok(ExitCode::FAILURE);
            }
        },
    }
    Ok(ExitCode::SUCCESS)
}

fn run_draft(app: &App, action: DraftAction) -> Result<ExitCode, AppError> {
    match action {
        DraftAction::Save { content, image } => {
            let mut composer = app.composer();
            composer.load(None)?;
            if !composer.set_content(content) {
                eprintln!("Draft is over the length limit.");
                return Ok(ExitCode::FAILURE);
            }
            if let Some(path) = image {
                composer.attach(ImageAttachment::from_path(&path)?);
            }
            composer.save_draft()?;
            println!("Draft saved.");
        }
        DraftAction::Show => {
            let draft = app.posts().load_draft()?;
            if draft.has_content() {
                println!("{}", draft.content);
                if let Some(name) = draft.image_name {
                    println!("[image: {name}]");
                }
            } else {
                println!("No draft.");
            }
        }
        DraftAction::Clear => {
            app.posts().clear_draft()?;
            println!("Draft cleared.");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_dashboard(app: &App) -> Result<(), AppError> {
    let summary = app.dashboard()?;
    println!("Scheduled posts: {}", summary.scheduled_count);
    println!("Drafts:          {}", summary.drafts_count);

    println!("\nUpcoming:");
    if summary.upcoming.is_empty() {
        println!("  nothing scheduled");
    }
    for post in &summary.upcoming {
        print_post(post);
    }

    println!("\nRecent activity:");
    for activity in &summary.recent_activity {
        let when = activity
            .at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "Recently".to_string());
        println!("  {} - {} - {}", activity.title, when, activity.details);
    }
    Ok(())
}

fn print_post(post: &ScheduledPost) {
    println!(
        "  [{}] {} {} ({}){}",
        post.id,
        post.scheduled_at.format("%Y-%m-%d %H:%M"),
        post.platform,
        post.tone,
        if post.image_preview.is_some() { " [image]" } else { "" }
    );
    println!("      {}", post.content);
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

/// Poll the store and re-render whenever another instance changes it,
/// until the session ends.
fn watch(app: &App) -> Result<(), AppError> {
    let dirty = Rc::new(Cell::new(false));

    let d = Rc::clone(&dirty);
    let _posts = app.bus().subscribe(Topic::PostsUpdated, move |_| d.set(true));
    let d = Rc::clone(&dirty);
    let _storage = app.bus().subscribe(Topic::Storage, move |event| {
        if let AppEvent::Storage { key } = event {
            tracing::info!(%key, "store changed elsewhere");
        }
        d.set(true);
    });

    print_dashboard(app)?;
    let interval = Duration::from_millis(app.config().watch_interval_ms);

    loop {
        std::thread::sleep(interval);
        app.sync_external()?;

        if !app.is_authenticated() {
            println!("Signed out elsewhere; redirecting to {}.", Route::Auth);
            return Ok(());
        }
        if dirty.replace(false) {
            println!();
            print_dashboard(app)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn planner(dir: &Path, args: &[&str]) -> ExitCode {
        let dir = dir.to_str().unwrap();
        let mut argv = vec!["planner", "--data-dir", dir];
        argv.extend_from_slice(args);

        let cli = Cli::try_parse_from(argv).unwrap();
        let config = AppConfig {
            data_dir: cli.data_dir.clone(),
            ..AppConfig::default()
        };
        run(cli, config).unwrap()
    }

    fn signed_in() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let code = planner(dir.path(), &["sign-in", "-e", "me@example.com", "-p", "secret"]);
        assert_eq!(code, ExitCode::SUCCESS);
        dir
    }

    #[test]
    fn test_signed_out_commands_fail() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(planner(dir.path(), &["calendar"]), ExitCode::FAILURE);
    }

    #[test]
    fn test_overlong_post_fails() {
        let dir = signed_in();
        let long = "x".repeat(501);
        assert_eq!(planner(dir.path(), &["post", "create", long.as_str()]), ExitCode::FAILURE);
        assert_eq!(planner(dir.path(), &["draft", "save", long.as_str()]), ExitCode::FAILURE);
        assert_eq!(planner(dir.path(), &["post", "create", "fits"]), ExitCode::SUCCESS);
    }

    #[test]
    fn test_missing_post_fails() {
        let dir = signed_in();
        assert_eq!(
            planner(dir.path(), &["post", "edit", "5", "--content", "x"]),
            ExitCode::FAILURE
        );
        assert_eq!(planner(dir.path(), &["post", "show", "5"]), ExitCode::FAILURE);
    }
}
