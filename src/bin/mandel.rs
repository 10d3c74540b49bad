// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error};
use image::png::PNGEncoder;
use image::ColorType;
use log::info;
use mandelbrot::{Coloring, RasterBuffer, RenderOptions};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

// Argument checkers.  Each returns the parsed value; the clap
// validators discard it and `run` keeps it.

fn split_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let mut halves = s.splitn(2, separator);
    let left = halves.next()?.trim().parse().ok()?;
    let right = halves.next()?.trim().parse().ok()?;
    Some((left, right))
}

fn dimensions(s: &str) -> Result<(u16, u16), String> {
    match split_pair::<u16>(s, 'x') {
        Some((0, _)) | Some((_, 0)) => Err("Image dimensions must be positive".to_string()),
        Some(size) => Ok(size),
        None => Err(format!("Could not parse output image size {:?}", s)),
    }
}

fn point(s: &str) -> Result<(f64, f64), String> {
    split_pair::<f64>(s, ',')
        .filter(|&(re, im)| re.is_finite() && im.is_finite())
        .ok_or_else(|| format!("Could not parse center point {:?}", s))
}

fn within<T>(s: &str, bounds: RangeInclusive<T>, what: &str) -> Result<T, String>
where
    T: FromStr + PartialOrd + Display,
{
    let n = s
        .parse::<T>()
        .map_err(|_| format!("Could not parse {} {:?}", what, s))?;
    if bounds.contains(&n) {
        Ok(n)
    } else {
        Err(format!(
            "{} must be between {} and {}",
            capitalized(what),
            bounds.start(),
            bounds.end()
        ))
    }
}

fn positive(s: &str, what: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        Ok(_) => Err(format!("{} must be positive", capitalized(what))),
        Err(_) => Err(format!("Could not parse {} {:?}", what, s)),
    }
}

fn capitalized(what: &str) -> String {
    let mut chars = what.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

const MAX_ITERATIONS: u32 = 200_000;

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const ZOOM: &str = "zoom";
const CENTER: &str = "center";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const COLORING: &str = "coloring";
const BAND_PERCENT: &str = "band-percent";
const THRESHOLD: &str = "threshold";
const INVERT: &str = "invert";
const SMOOTH: &str = "smooth";
const SEED: &str = "seed";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .about("Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output PNG file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1500x750")
                .validator(|s| dimensions(&s).map(drop))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .required(false)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("1")
                .validator(|s| positive(&s, "zoom").map(drop))
                .help("Magnification relative to the whole set"),
        )
        .arg(
            Arg::with_name(CENTER)
                .required(false)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0,0")
                .validator(|s| point(&s).map(drop))
                .help("Point of the complex plane at the middle of the image, as re,im"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("0")
                .validator(move |s| within(&s, 0..=max_threads, "thread count").map(drop))
                .help("Number of threads to use in solver; 0 uses every CPU"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| within(&s, 1..=MAX_ITERATIONS, "iteration count").map(drop))
                .help("Maximum number of iterations per pixel"),
        )
        .arg(
            Arg::with_name(COLORING)
                .required(false)
                .long(COLORING)
                .takes_value(true)
                .possible_values(&["banded", "equalized"])
                .default_value("banded")
                .help("Color mapping strategy"),
        )
        .arg(
            Arg::with_name(BAND_PERCENT)
                .required(false)
                .long(BAND_PERCENT)
                .takes_value(true)
                .default_value("1")
                .validator(|s| positive(&s, "band percentage").map(drop))
                .help("Width of one color band, as a percentage of the colored range"),
        )
        .arg(
            Arg::with_name(THRESHOLD)
                .required(false)
                .long(THRESHOLD)
                .takes_value(true)
                .default_value("1000")
                .validator(|s| within(&s, 1..=u32::max_value(), "color threshold").map(drop))
                .help("Highest iteration count that gets its own band"),
        )
        .arg(
            Arg::with_name(INVERT)
                .long(INVERT)
                .help("Invert the equalized gradient"),
        )
        .arg(
            Arg::with_name(SMOOTH)
                .long(SMOOTH)
                .help("Use fractional escape times"),
        )
        .arg(
            Arg::with_name(SEED)
                .required(false)
                .long(SEED)
                .takes_value(true)
                .validator(|s| match u64::from_str(&s) {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Could not parse seed".to_string()),
                })
                .help("Seed for the band colors; omit for a new palette every run"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing value for --{}", name))?;
    T::from_str(raw).map_err(|_| format_err!("could not parse --{} value {:?}", name, raw))
}

fn checked<T, F>(matches: &ArgMatches, name: &str, check: F) -> Result<T, Error>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing value for --{}", name))?;
    check(raw).map_err(|e| format_err!("--{}: {}", name, e))
}

fn options(matches: &ArgMatches) -> Result<RenderOptions, Error> {
    let coloring = match matches.value_of(COLORING) {
        Some("equalized") => Coloring::Equalized {
            invert: matches.is_present(INVERT),
        },
        _ => Coloring::Banded {
            band_percent: value(matches, BAND_PERCENT)?,
            color_threshold: value(matches, THRESHOLD)?,
        },
    };
    let mut options = RenderOptions::default()
        .max_iterations(value(matches, ITERATIONS)?)
        .smooth(matches.is_present(SMOOTH))
        .coloring(coloring);
    let threads: usize = value(matches, THREADS)?;
    if threads > 0 {
        options = options.threads(threads);
    }
    if matches.is_present(SEED) {
        options = options.seed(value(matches, SEED)?);
    }
    Ok(options)
}

fn write_image(outfile: &str, raster: &RasterBuffer) -> Result<(), Error> {
    let path = Path::new(outfile);
    let output = BufWriter::new(File::create(&path)?);
    let encoder = PNGEncoder::new(output);
    encoder.encode(
        raster.as_raw(),
        raster.width() as u32,
        raster.height() as u32,
        ColorType::RGBA(8),
    )?;
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = checked(matches, SIZE, dimensions)?;
    let (center_x, center_y) = checked(matches, CENTER, point)?;
    let zoom: f64 = value(matches, ZOOM)?;
    let options = options(matches)?;
    let outfile = matches
        .value_of(OUTPUT)
        .ok_or_else(|| format_err!("missing output file"))?;

    info!(
        "rendering {}x{} at {}+{}i, zoom {}, {} iterations",
        width, height, center_x, center_y, zoom, options.max_iterations
    );
    let raster = mandelbrot::render_image(
        usize::from(width),
        usize::from(height),
        zoom,
        center_x,
        center_y,
        &options,
    )?;
    write_image(outfile, &raster)?;
    info!("wrote {}", outfile);
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
