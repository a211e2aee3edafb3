//! Extractive sentence selection via seeded k-means clustering.
//!
//! Sentences are grouped in embedding space and one representative per
//! cluster is kept, which preserves topical coverage while discarding
//! redundant phrasing. The same seed always yields the same selection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::ClusteringError;

/// Upper bound on Lloyd iterations before we accept the current partition.
const MAX_ITERATIONS: usize = 100;

/// Pick `target` representative sentences from `sentences`.
///
/// Each sentence must come with one embedding vector at the same index.
/// When the sentence count does not exceed `target`, the input is returned
/// unchanged in its original order and no clustering runs. Otherwise the
/// embeddings are partitioned into `target` clusters and, for every
/// non-empty cluster in ascending cluster order, the sentence closest to
/// the centroid by cosine similarity is emitted. Ties prefer the earliest
/// sentence. Clusters that end up empty are skipped, so the result may
/// hold fewer than `target` entries.
pub fn select_representatives(
    sentences: &[String],
    embeddings: &[Vec<f32>],
    target: usize,
    seed: u64,
) -> Result<Vec<String>, ClusteringError> {
    if target == 0 {
        return Err(ClusteringError::InvalidTargetCount);
    }
    if sentences.len() != embeddings.len() {
        return Err(ClusteringError::LengthMismatch {
            sentences: sentences.len(),
            embeddings: embeddings.len(),
        });
    }
    if sentences.is_empty() {
        return Ok(Vec::new());
    }
    if sentences.len() <= target {
        return Ok(sentences.to_vec());
    }

    validate_embeddings(embeddings)?;

    let assignments = cluster(embeddings, target, seed);
    let centroids = compute_centroids(embeddings, &assignments, target);

    let mut selected = Vec::with_capacity(target);
    for cluster_idx in 0..target {
        let mut best: Option<(usize, f32)> = None;
        for (idx, assignment) in assignments.iter().enumerate() {
            if *assignment != cluster_idx {
                continue;
            }
            let similarity = cosine_similarity(&embeddings[idx], &centroids[cluster_idx]);
            let replace = match best {
                Some((_, best_similarity)) => similarity > best_similarity,
                None => true,
            };
            if replace {
                best = Some((idx, similarity));
            }
        }
        if let Some((idx, _)) = best {
            selected.push(sentences[idx].clone());
        }
    }
    Ok(selected)
}

fn validate_embeddings(embeddings: &[Vec<f32>]) -> Result<(), ClusteringError> {
    let expected = embeddings[0].len();
    if expected == 0 {
        return Err(ClusteringError::EmptyEmbedding);
    }
    for (index, embedding) in embeddings.iter().enumerate() {
        if embedding.len() != expected {
            return Err(ClusteringError::DimensionMismatch {
                expected,
                actual: embedding.len(),
            });
        }
        if embedding.iter().any(|value| !value.is_finite()) {
            return Err(ClusteringError::NonFinite { index });
        }
    }
    Ok(())
}

/// Run seeded k-means++ initialization followed by Lloyd iterations.
///
/// Returns the cluster assignment for every embedding. Empty clusters keep
/// their last centroid, which leaves them empty on subsequent passes.
fn cluster(embeddings: &[Vec<f32>], k: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = initialize_centroids(embeddings, k, &mut rng);
    let mut assignments = vec![0_usize; embeddings.len()];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (idx, embedding) in embeddings.iter().enumerate() {
            let nearest = nearest_centroid(embedding, &centroids);
            if assignments[idx] != nearest {
                assignments[idx] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        let updated = compute_centroids(embeddings, &assignments, k);
        for (cluster_idx, centroid) in updated.into_iter().enumerate() {
            if !centroid.is_empty() {
                centroids[cluster_idx] = centroid;
            }
        }
    }
    assignments
}

/// k-means++ seeding: later centroids are sampled proportionally to their
/// squared distance from the nearest centroid chosen so far.
fn initialize_centroids(embeddings: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let first = rng.gen_range(0..embeddings.len());
    let mut centroids = vec![embeddings[first].clone()];

    while centroids.len() < k {
        let weights: Vec<f32> = embeddings
            .iter()
            .map(|embedding| {
                centroids
                    .iter()
                    .map(|centroid| squared_distance(embedding, centroid))
                    .fold(f32::INFINITY, f32::min)
            })
            .collect();
        let total: f32 = weights.iter().sum();
        let next = if total > 0.0 {
            let threshold = rng.gen_range(0.0..total);
            let mut accumulated = 0.0;
            let mut chosen = embeddings.len() - 1;
            for (idx, weight) in weights.iter().enumerate() {
                accumulated += weight;
                if accumulated > threshold {
                    chosen = idx;
                    break;
                }
            }
            chosen
        } else {
            rng.gen_range(0..embeddings.len())
        };
        centroids.push(embeddings[next].clone());
    }
    centroids
}

fn nearest_centroid(embedding: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best_idx = 0;
    let mut best_distance = f32::INFINITY;
    for (idx, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(embedding, centroid);
        if distance < best_distance {
            best_distance = distance;
            best_idx = idx;
        }
    }
    best_idx
}

/// Mean of each cluster's members; empty clusters yield an empty vector.
fn compute_centroids(
    embeddings: &[Vec<f32>],
    assignments: &[usize],
    k: usize,
) -> Vec<Vec<f32>> {
    let dimension = embeddings[0].len();
    let mut sums = vec![vec![0.0_f32; dimension]; k];
    let mut counts = vec![0_usize; k];
    for (embedding, assignment) in embeddings.iter().zip(assignments) {
        counts[*assignment] += 1;
        for (slot, value) in sums[*assignment].iter_mut().zip(embedding) {
            *slot += value;
        }
    }
    sums.into_iter()
        .zip(counts)
        .map(|(mut sum, count)| {
            if count == 0 {
                return Vec::new();
            }
            for slot in &mut sum {
                *slot /= count as f32;
            }
            sum
        })
        .collect()
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(left, right)| {
            let diff = left - right;
            diff * diff
        })
        .sum()
}

/// Cosine similarity with a zero-magnitude guard.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(left, right)| left * right).sum();
    let mag_a: f32 = a.iter().map(|value| value * value).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|value| value * value).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}
