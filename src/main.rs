use after_stories::config::{self, PlatformConfig};
use after_stories::imaging::{
    AspectRatio, CropParams, DataUrl, ImageBackend, RustBackend, canvas_dimensions,
    transform_bytes,
};
use after_stories::output;
use after_stories::platform::{DeletionRequest, Platform};
use after_stories::store::FileBackend;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::prelude::*;

/// Credentials for commands that change content.
#[derive(clap::Args, Clone)]
struct AuthArgs {
    /// Password of an editorial account
    #[arg(long)]
    password: String,
}

/// Confirmation for destructive commands.
#[derive(clap::Args, Clone)]
struct ConfirmArgs {
    /// Perform the deletion instead of only describing it
    #[arg(long)]
    yes: bool,
}

#[derive(Parser)]
#[command(name = "after-stories")]
#[command(about = "Story platform for recovery narratives")]
#[command(long_about = "\
Story platform for recovery narratives

Visitors read published stories and send their own. An editorial team of
editors, approvers and an admin curates them. All state lives as JSON files
in the data directory:

  data/
  ├── after.toml               # Optional config overrides
  ├── after_stories.json
  ├── after_categories.json
  ├── after_submissions.json   # Newest first
  ├── after_admin_users.json
  ├── after_branding.json
  └── after_visited.json

Missing or corrupt files fall back to the seed content.

Run 'after-stories gen-config' to generate a documented after.toml.")]
#[command(version)]
struct Cli {
    /// Data directory
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize stored content
    Status,
    /// List stories (published only unless --all)
    Stories {
        /// Limit to one category id
        #[arg(long)]
        category: Option<String>,
        /// Include drafts
        #[arg(long)]
        all: bool,
    },
    /// Read published stories in full, in the order given
    Read {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Send a visitor story
    Submit {
        /// What happened
        #[arg(long)]
        slipped: String,
        /// What helped
        #[arg(long)]
        helped: String,
        /// Optional photo to attach
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// List pending submissions, newest first
    Inbox(AuthArgs),
    /// Turn a submission into a stored draft story
    Promote {
        id: String,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Discard a submission
    Discard {
        id: String,
        #[command(flatten)]
        auth: AuthArgs,
        #[command(flatten)]
        confirm: ConfirmArgs,
    },
    /// Make a story live
    Publish {
        id: String,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Return a story to draft
    Unpublish {
        id: String,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Permanently delete a story
    DeleteStory {
        id: String,
        #[command(flatten)]
        auth: AuthArgs,
        #[command(flatten)]
        confirm: ConfirmArgs,
    },
    /// List categories with story counts
    Categories,
    /// Add a category; its id is derived from the label
    AddCategory {
        label: String,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Delete a category, moving its stories to the first remaining one
    DeleteCategory {
        id: String,
        #[command(flatten)]
        auth: AuthArgs,
        #[command(flatten)]
        confirm: ConfirmArgs,
    },
    /// Crop an image file to a fixed aspect and write it as JPEG
    Crop {
        input: PathBuf,
        output: PathBuf,
        /// Aspect ratio as W:H
        #[arg(long, default_value = "16:9")]
        aspect: AspectRatio,
        /// Scale applied to the source (1.0 = natural size)
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        /// Horizontal shift in output pixels
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset_x: f64,
        /// Vertical shift in output pixels
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset_y: f64,
    },
    /// Print a stock after.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    std::fs::create_dir_all(&cli.data_dir)?;
    let config = config::load_config(&cli.data_dir)?;

    if let Command::Crop {
        input,
        output,
        aspect,
        zoom,
        offset_x,
        offset_y,
    } = &cli.command
    {
        let crop = CropParams {
            offset_x: *offset_x,
            offset_y: *offset_y,
            scale: *zoom,
        };
        return crop_file(&config, input, output, *aspect, crop);
    }

    let mut platform = Platform::with_config(FileBackend::open(&cli.data_dir)?, config);

    match cli.command {
        Command::Status => {
            output::print_lines(&output::format_status(
                platform.state(),
                platform.role(),
                platform.capabilities(),
            ));
        }
        Command::Stories { category, all } => {
            let state = platform.state();
            let lines = if all {
                let stories = state
                    .stories
                    .iter()
                    .filter(|s| category.as_deref().is_none_or(|c| s.category == c));
                output::format_stories(state, stories)
            } else {
                output::format_stories(state, platform.public_stories(category.as_deref()))
            };
            output::print_lines(&lines);
        }
        Command::Read { ids } => {
            if let Some(greeting) = platform.visit().greeting() {
                println!("{greeting}");
            }
            for id in &ids {
                let lines = output::format_story_view(&platform.view_story(id)?);
                output::print_lines(&lines);
            }
        }
        Command::Submit {
            slipped,
            helped,
            photo,
        } => {
            let image = photo
                .map(|path| DataUrl::from_file(&path).map(|d| d.to_url()))
                .transpose()?;
            let submission = platform.submit_story(&slipped, &helped, image)?;
            println!("Thank you. Your story was received ({}).", submission.id);
        }
        Command::Inbox(auth) => {
            platform.authenticate(&auth.password)?;
            output::print_lines(&output::format_inbox(&platform.state().submissions));
        }
        Command::Promote { id, auth } => {
            platform.authenticate(&auth.password)?;
            let story_id = platform.promote_submission(&id)?.id.clone();
            println!("Promoted {id} to draft story {story_id}");
        }
        Command::Discard { id, auth, confirm } => {
            platform.authenticate(&auth.password)?;
            let request = platform.request_discard_submission(&id)?;
            confirm_or_describe(&mut platform, request, confirm.yes)?;
        }
        Command::Publish { id, auth } => {
            platform.authenticate(&auth.password)?;
            platform.set_published(&id, true)?;
            println!("{id} is live");
        }
        Command::Unpublish { id, auth } => {
            platform.authenticate(&auth.password)?;
            platform.set_published(&id, false)?;
            println!("{id} is a draft");
        }
        Command::DeleteStory { id, auth, confirm } => {
            platform.authenticate(&auth.password)?;
            let request = platform.request_story_deletion(&id)?;
            confirm_or_describe(&mut platform, request, confirm.yes)?;
        }
        Command::Categories => {
            output::print_lines(&output::format_categories(platform.state()));
        }
        Command::AddCategory { label, auth } => {
            platform.authenticate(&auth.password)?;
            let category = platform.add_category(&label)?;
            println!("Added {}: {}", category.id, category.label);
        }
        Command::DeleteCategory { id, auth, confirm } => {
            platform.authenticate(&auth.password)?;
            let request = platform.request_category_deletion(&id)?;
            confirm_or_describe(&mut platform, request, confirm.yes)?;
        }
        Command::Crop { .. } | Command::GenConfig => {}
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn confirm_or_describe(
    platform: &mut Platform<FileBackend>,
    request: DeletionRequest,
    confirmed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !confirmed {
        println!("{}", request.prompt());
        println!("Re-run with --yes to confirm.");
        return Ok(());
    }
    let deleted = platform.confirm_deletion(request)?;
    output::print_lines(&output::format_deleted(&deleted));
    Ok(())
}

fn crop_file(
    config: &PlatformConfig,
    input: &Path,
    output_path: &Path,
    aspect: AspectRatio,
    crop: CropParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let limits = config.crop_limits();
    let crop = CropParams {
        scale: crop.scale.clamp(limits.zoom_min, limits.zoom_max),
        offset_x: crop.offset_x.clamp(-limits.offset_limit, limits.offset_limit),
        offset_y: crop.offset_y.clamp(-limits.offset_limit, limits.offset_limit),
    };
    let params = config.transform_params(aspect, crop);
    let source = std::fs::read(input)?;
    let backend = RustBackend::new();
    let dims = backend.identify(&source)?;
    let raster = transform_bytes(&backend, &source, &params)?;
    std::fs::write(output_path, &raster.bytes)?;
    output::print_lines(&output::format_crop(
        dims,
        canvas_dimensions(params.target_width, aspect),
        raster.bytes.len(),
    ));
    Ok(())
}
