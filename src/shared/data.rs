// Loader for the per-cell observation lists

use crate::shared::config::DataSource;
use crate::shared::errors::ModelError;
use crate::shared::likelihood::{bucket_index, ObservedHistogram};
use crate::shared::state_space::{ModelFamily, PromoterState};
use anyhow::Result;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteState {
    Off,
    On,
    SuperOn,
}

/// Classify a transcription-site intensity. Zero is OFF; a positive
/// intensity is ON, or super-ON above `threshold` for the three promoter
/// family.
pub fn classify_site(intensity: f64, family: ModelFamily, threshold: f64) -> SiteState {
    if intensity == 0. {
        SiteState::Off
    } else if family == ModelFamily::TwoState || intensity <= threshold {
        SiteState::On
    } else {
        SiteState::SuperOn
    }
}

/// Promoter configuration of a cell from the state of its two sites.
pub fn combine_sites(first: SiteState, second: SiteState) -> PromoterState {
    let mut promoter = PromoterState::default();
    for site in [first, second] {
        match site {
            SiteState::Off => {}
            SiteState::On => promoter.active += 1,
            SiteState::SuperOn => promoter.super_active += 1,
        }
    }
    promoter
}

pub fn histogram_path(source: &DataSource, time: u32) -> PathBuf {
    source
        .directory
        .join(format!("myData_{}_t{}_List.txt", source.code, time))
}

/// Build a histogram from lines `ts1 ts2 m` (two site intensities and the
/// number of mRNA molecules of a cell).
pub fn parse_histogram<R: BufRead>(
    reader: R,
    family: ModelFamily,
    max_mrna: usize,
    threshold: f64,
) -> Result<ObservedHistogram> {
    let mut histogram = ObservedHistogram::zeros(family, max_mrna);
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let malformed = || {
            ModelError::DataUnavailable(format!("line {}: malformed record \"{}\"", number + 1, line))
        };
        if fields.len() != 3 {
            return Err(malformed().into());
        }
        let ts1: f64 = fields[0].parse().map_err(|_| malformed())?;
        let ts2: f64 = fields[1].parse().map_err(|_| malformed())?;
        let mrna: usize = fields[2].parse().map_err(|_| malformed())?;
        if mrna > max_mrna {
            return Err(ModelError::DataUnavailable(format!(
                "line {}: {} mRNA molecules, above the maximum {}",
                number + 1,
                mrna,
                max_mrna
            ))
            .into());
        }
        let promoter = combine_sites(
            classify_site(ts1, family, threshold),
            classify_site(ts2, family, threshold),
        );
        let bucket = bucket_index(family, &promoter).ok_or_else(malformed)?;
        histogram.record(mrna, bucket)?;
    }
    Ok(histogram)
}

/// Load the histogram observed at `time`.
pub fn load_histogram(
    source: &DataSource,
    family: ModelFamily,
    max_mrna: usize,
    time: u32,
) -> Result<ObservedHistogram> {
    let path = histogram_path(source, time);
    let file = File::open(&path).map_err(|e| {
        ModelError::DataUnavailable(format!("cannot open {}: {}", path.display(), e))
    })?;
    let histogram = parse_histogram(
        BufReader::new(file),
        family,
        max_mrna,
        source.intensity_threshold,
    )?;
    if histogram.total() == 0 {
        return Err(ModelError::DataUnavailable(format!(
            "no cell recorded in {}",
            path.display()
        ))
        .into());
    }
    debug!(
        "Loaded {} cells from {}",
        histogram.total(),
        path.display()
    );
    Ok(histogram)
}

/// One histogram per time point, in order.
pub fn load_histograms(
    source: &DataSource,
    family: ModelFamily,
    max_mrna: usize,
    time_points: &[u32],
) -> Result<Vec<ObservedHistogram>> {
    time_points
        .iter()
        .map(|&t| load_histogram(source, family, max_mrna, t))
        .collect()
}
