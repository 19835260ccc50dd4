//! Merging repeated measurements of a leg.

use std::collections::HashMap;

use super::Shot;

/// Averaging configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Leave splay shots out of the result.
    pub drop_splays: bool,
}

/// Circular mean of bearings in degrees, in `(-180, 180]`.
///
/// The mean of no bearings is `0.0`.
pub fn avgdeg(degrees: &[f64]) -> f64 {
    let (sin, cos) = degrees
        .iter()
        .map(|d| d.to_radians().sin_cos())
        .fold((0.0, 0.0), |(s, c), (sin, cos)| (s + sin, c + cos));

    sin.atan2(cos).to_degrees()
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    values.sum::<f64>() / n as f64
}

/// Merge shots measuring the same leg.
///
/// Shots are grouped by their unordered pair of stations. Shots measured in
/// the opposite direction of the first shot of their group are reversed
/// before merging. A merged shot takes the mean tape and clino, the circular
/// mean compass, and everything else from the first shot of its group.
/// Groups appear in the order of their first shot. Splays are never merged.
pub fn average_shots(shots: &[Shot], options: &Options) -> Vec<Shot> {
    let mut groups: Vec<Vec<Shot>> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for shot in shots {
        if shot.is_splay() {
            if !options.drop_splays {
                groups.push(vec![shot.clone()]);
            }
            continue;
        }

        let forward = (shot.from.as_str(), shot.to.as_str());
        let backward = (shot.to.as_str(), shot.from.as_str());

        if let Some(&i) = index.get(&forward) {
            groups[i].push(shot.clone());
        } else if let Some(&i) = index.get(&backward) {
            groups[i].push(shot.reversed());
        } else {
            index.insert(forward, groups.len());
            groups.push(vec![shot.clone()]);
        }
    }

    groups.into_iter().filter_map(merge).collect()
}

fn merge(group: Vec<Shot>) -> Option<Shot> {
    let compass: Vec<f64> = group.iter().map(|s| s.compass).collect();
    let tape = mean(group.iter().map(|s| s.tape));
    let clino = mean(group.iter().map(|s| s.clino));
    let first = group.into_iter().next()?;

    if compass.len() == 1 {
        return Some(first);
    }

    Some(Shot {
        tape,
        compass: avgdeg(&compass).rem_euclid(360.0),
        clino,
        ..first
    })
}
