//! Scent command - Dump the scent field of an environment as CSV

use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    app::SimulationConfig,
    cli::output::{print_kv, print_section},
    types::Position,
    world::Environment,
};

#[derive(Parser, Debug)]
#[command(about = "Write the scent field of an environment as CSV")]
pub struct ScentArgs {
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    #[arg(long, default_value_t = 100)]
    pub height: usize,

    /// Randomly placed food items (ignored when --place is given)
    #[arg(long, default_value_t = 5)]
    pub food: usize,

    #[arg(long, default_value_t = 120)]
    pub calories: u32,

    /// Place food explicitly as "x,y" or "x,y:calories"; repeatable
    #[arg(long, short = 'p')]
    pub place: Vec<String>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file; stdout when omitted
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Parse `x,y` or `x,y:calories`.
pub(crate) fn parse_placement(raw: &str, default_calories: u32) -> Result<(Position, u32)> {
    let (coords, calories) = match raw.split_once(':') {
        Some((coords, calories)) => (
            coords,
            calories
                .trim()
                .parse::<u32>()
                .with_context(|| format!("invalid calories in '{raw}'"))?,
        ),
        None => (raw, default_calories),
    };
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| anyhow!("invalid placement '{raw}' (expected x,y or x,y:calories)"))?;
    let x = x.trim().parse::<usize>().with_context(|| format!("invalid x in '{raw}'"))?;
    let y = y.trim().parse::<usize>().with_context(|| format!("invalid y in '{raw}'"))?;
    Ok((Position::new(x, y), calories))
}

pub(crate) fn build_environment(args: &ScentArgs) -> Result<Environment> {
    if args.place.is_empty() {
        let config = SimulationConfig::default()
            .with_grid(args.width, args.height)
            .with_food(args.food, args.calories);
        config.validate()?;
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        return Ok(Environment::from_config(&config, &mut rng)?);
    }

    let mut env = Environment::new(args.width, args.height)?;
    for raw in &args.place {
        let (position, calories) = parse_placement(raw, args.calories)?;
        env.place_food(position, calories)?;
    }
    Ok(env)
}

/// Write the field row by row, top to bottom, without a header.
pub(crate) fn write_field<W: Write>(env: &Environment, writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for row in env.scent().rows() {
        writer.write_record(row.iter().map(|odor| odor.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn execute(args: ScentArgs) -> Result<()> {
    let env = build_environment(&args)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_field(&env, file)?;

            print_section("Scent field");
            print_kv("Grid", &format!("{} x {}", env.width(), env.height()));
            print_kv("Food", &env.foods().len().to_string());
            print_kv("Peak", &env.scent().peak().to_string());
            print_kv("Written to", &path.display().to_string());
        }
        None => write_field(&env, io::stdout().lock())?,
    }
    Ok(())
}
