use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use structopt::StructOpt;

use log::{debug, info, initialize_logger};
use vino::config::Config;
use vino::environment::Environment;
use vino::image::{DataUrlEncoder, ImageEncoder};
use vino::journal::Journal;
use vino::render::{render_card, render_journal};
use vino::review::{DrinkType, ImageRef, NewReview, Rating};

#[derive(Debug, StructOpt)]
#[structopt(name = "vino", about = "Record and browse tasting reviews")]
enum Opt {
    /// Print every review, newest first
    List,

    /// Add a review
    Add(AddOpt),
}

#[derive(Debug, StructOpt)]
struct AddOpt {
    /// The name of the drink
    #[structopt(long)]
    name: String,

    /// Your nickname
    #[structopt(long)]
    nickname: String,

    /// wine, beer, spirits, cocktail or other
    #[structopt(long = "type", default_value = "wine")]
    drink_type: DrinkType,

    /// From 1 to 5 in steps of 0.5
    #[structopt(long, default_value = "5")]
    rating: f64,

    /// Tasting notes
    #[structopt(long, default_value = "")]
    notes: String,

    /// A photo to embed
    #[structopt(long, parse(from_os_str), conflicts_with = "image-url")]
    photo: Option<PathBuf>,

    /// A reference to a photo elsewhere
    #[structopt(long)]
    image_url: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let opt = Opt::from_args();
    let logger = Arc::new(initialize_logger());

    let config = Config::from_env()?;
    info!(logger, "Starting..."; "data_dir" => %config.data_dir().display(), "storage_key" => config.storage_key());

    let environment = Environment::with_file_store(logger.clone(), config)?;
    let mut journal = environment.open_journal();
    report_notices(&mut journal);

    match opt {
        Opt::List => println!("{}", render_journal(journal.reviews())),
        Opt::Add(add) => {
            let image_url = match (add.photo, add.image_url) {
                (Some(path), _) => {
                    debug!(logger, "Encoding photo..."; "path" => %path.display());
                    DataUrlEncoder.encode(&path).await?
                }
                (None, Some(reference)) => ImageRef::new(reference),
                (None, None) => ImageRef::default(),
            };

            let submission = NewReview {
                name: add.name,
                nickname: add.nickname,
                drink_type: add.drink_type,
                rating: Rating::new(add.rating),
                notes: add.notes,
                image_url,
            };

            let review = journal.submit(submission)?;

            println!("{}", render_card(review));
            report_notices(&mut journal);
        }
    }

    info!(logger, "Exiting..."; "count" => journal.len());

    Ok(())
}

fn report_notices(journal: &mut Journal) {
    for notice in journal.take_notices() {
        eprintln!("warning: {}", notice);
    }
}
