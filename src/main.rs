use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use ecofeed::backend::ContentSource;
use ecofeed::backend::http::HttpBackend;
use ecofeed::catalog;
use ecofeed::challenge::submit_challenge;
use ecofeed::config::Config;
use ecofeed::feed::item::{Challenge, FeedItem};
use ecofeed::personalize::PersonalizationState;
use ecofeed::session::FeedSession;
use ecofeed::store::json_store::JsonProfileStore;
use ecofeed::store::memory_store::MemoryProfileStore;
use ecofeed::store::schema::{InterestAnswers, UserLocation};
use ecofeed::store::{ProfileStoreExt, UserProfileStore};

#[derive(Parser)]
#[command(name = "ecofeed", version, about = "Climate awareness reel feed")]
struct Cli {
    #[arg(short, long, help = "Story backend base URL")]
    backend: Option<String>,

    #[arg(long, help = "Keep profile state in memory only")]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose and print one scroll session
    Feed {
        #[arg(long, help = "Print items as JSON")]
        json: bool,
        #[arg(long, help = "Skip the backend and use the offline topic feed")]
        offline: bool,
    },
    /// Request a personalized story
    Personalize {
        #[arg(long, help = "Place name the story is about")]
        place: Option<String>,
        #[arg(long)]
        drink: Option<String>,
        #[arg(long)]
        walk: Option<String>,
        #[arg(long)]
        habit: Option<String>,
        #[arg(long, help = "Wait until the video is listed by the backend")]
        wait: bool,
        #[arg(long, help = "Record that location access was denied instead")]
        deny_location: bool,
    },
    /// Show stored profile and personalization state
    Status,
    /// Submit evidence for a catalog challenge
    Validate {
        #[arg(long, help = "Challenge catalog index")]
        challenge: usize,
        #[arg(long, help = "Image data URL, or @path to a file containing one")]
        image: String,
    },
    /// Forget any pending personalized video
    Reset,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.backend {
        config.backend_url = url;
        config.validate();
    }

    let store: Arc<dyn UserProfileStore> = if cli.ephemeral {
        Arc::new(MemoryProfileStore::new())
    } else {
        Arc::new(JsonProfileStore::with_base_dir(config.data_path())?)
    };
    let source: Arc<dyn ContentSource> = Arc::new(HttpBackend::new(&config));

    match cli.command {
        Command::Feed { json, offline } => print_feed(config, source, store, json, offline),
        Command::Personalize {
            place,
            drink,
            walk,
            habit,
            wait,
            deny_location,
        } => {
            let mut session = FeedSession::new(config, source, store.clone());
            if deny_location {
                session.location_denied()?;
                println!("Continuing without personalization.");
                return Ok(());
            }
            let location = match place {
                Some(name) => UserLocation::named(&name),
                None => store
                    .user_location()
                    .context("no --place given and no stored location")?,
            };
            let interests = InterestAnswers {
                drink,
                walking_place: walk,
                other_habit: habit,
            };
            personalize(&mut session, &location, &interests, wait)
        }
        Command::Status => {
            let session = FeedSession::new(config, source, store.clone());
            println!("points:          {}", store.points());
            println!("onboarding seen: {}", store.onboarding_seen());
            match store.user_location() {
                Some(loc) => println!("location:        {}", loc.place_name),
                None => println!("location:        (none)"),
            }
            println!("personalization: {}", session.personalization().label());
            Ok(())
        }
        Command::Validate { challenge, image } => {
            let image = match image.strip_prefix('@') {
                Some(path) => fs::read_to_string(path)
                    .with_context(|| format!("reading image data URL from {path}"))?,
                None => image,
            };
            let item = Challenge::from_template(
                format!("challenge-{challenge}"),
                catalog::challenge(challenge),
            );
            let outcome = submit_challenge(source.as_ref(), &item, image.trim())?;
            println!(
                "{} accepted (+{} points{})",
                item.title,
                outcome.points,
                if outcome.validated { ", verified" } else { "" }
            );
            if let Some(message) = outcome.message {
                println!("{message}");
            }
            Ok(())
        }
        Command::Reset => {
            let mut session = FeedSession::new(config, source, store);
            session.reset_personalization();
            println!("Personalization reset.");
            Ok(())
        }
    }
}

fn print_feed(
    config: Config,
    source: Arc<dyn ContentSource>,
    store: Arc<dyn UserProfileStore>,
    json: bool,
    offline: bool,
) -> Result<()> {
    let mut session = FeedSession::new(config, source, store);
    if offline {
        session.set_videos(Vec::new());
    } else {
        session.load_feed();
    }
    let feed = session.composed_feed();

    if json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
        return Ok(());
    }
    for (index, item) in feed.iter().enumerate() {
        println!("{index:>3}  {:<20} {}", kind_label(item), item.title());
    }
    Ok(())
}

fn kind_label(item: &FeedItem) -> &'static str {
    match item {
        FeedItem::Video(v) if v.is_personalized => "personalized video",
        FeedItem::Video(_) => "video",
        FeedItem::Quiz(_) => "quiz",
        FeedItem::Challenge(_) => "challenge",
        FeedItem::Loading { .. } => "loading",
        FeedItem::PersonalizedPrompt { .. } => "personalize prompt",
    }
}

fn personalize(
    session: &mut FeedSession,
    location: &UserLocation,
    interests: &InterestAnswers,
    wait: bool,
) -> Result<()> {
    session.request_personalization(location, interests)?;
    info!(place = %location.place_name, "personalized story requested");
    println!("Generating a story for {}...", location.place_name);

    // Phase one: the generation request returns once the backend accepted it.
    // The poller starts only after that acknowledgement.
    while session.personalization().is_generating() && !session.is_polling() {
        session.pump(Duration::from_secs(1))?;
    }
    if session.is_polling() && !wait {
        println!("Requested. Run `ecofeed feed` later to see it.");
        return Ok(());
    }

    let interval = session.config().poll_interval();
    while session.personalization().is_generating() {
        session.pump(interval)?;
    }
    match session.personalization() {
        PersonalizationState::Ready(video) => {
            println!("Ready: {}", video.media_url.as_deref().unwrap_or("(no media)"));
            Ok(())
        }
        PersonalizationState::Failed(reason) => bail!("generation failed: {reason}"),
        PersonalizationState::Absent | PersonalizationState::Generating => {
            bail!("generation was cancelled")
        }
    }
}
