use super::board::Board;
use super::error::{DatasetError, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use rand::seq::index;
use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// Drawn boards stay in the pool for later batches.
    #[default]
    Preserving,
    /// Drawn boards leave the pool for good.
    Draining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Train,
    Test,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => write!(f, "train"),
            Self::Test => write!(f, "test"),
        }
    }
}

pub type Batch = Vec<Arc<Board>>;

/// Random batches of boards, without repeats inside a batch.
///
/// Without a split every board sits in the `Train` pool and `Test` is empty.
pub struct BatchSampler<R: Rng> {
    train: Vec<Arc<Board>>,
    test: Vec<Arc<Board>>,
    mode: SamplingMode,
    rng: R,
}

impl<R: Rng> BatchSampler<R> {
    pub fn new(boards: Vec<Board>, mode: SamplingMode, rng: R) -> Self {
        Self {
            train: boards.into_iter().map(Arc::new).collect(),
            test: Vec::new(),
            mode,
            rng,
        }
    }

    /// Shuffles once, then puts the first `train_fraction` of boards in the
    /// `Train` pool and the rest in `Test`.
    pub fn with_split(
        boards: Vec<Board>,
        train_fraction: f64,
        mode: SamplingMode,
        mut rng: R,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&train_fraction) {
            return Err(DatasetError::InvalidConfig(format!(
                "train fraction must be within [0, 1], got {}",
                train_fraction
            )));
        }

        let mut pool: Vec<Arc<Board>> = boards.into_iter().map(Arc::new).collect();
        pool.shuffle(&mut rng);
        let train_len = (pool.len() as f64 * train_fraction).round() as usize;
        let test = pool.split_off(train_len);
        log::debug!(
            "split {} boards into {} train / {} test",
            train_len + test.len(),
            train_len,
            test.len()
        );

        Ok(Self {
            train: pool,
            test,
            mode,
            rng,
        })
    }

    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    pub fn remaining(&self, partition: Partition) -> usize {
        self.pool(partition).len()
    }

    pub fn pool(&self, partition: Partition) -> &[Arc<Board>] {
        match partition {
            Partition::Train => &self.train,
            Partition::Test => &self.test,
        }
    }

    /// Draws `size` distinct boards uniformly at random from `partition`.
    ///
    /// Asking for more boards than the pool holds is an error; a short batch
    /// is never returned.
    pub fn sample_batch(&mut self, size: usize, partition: Partition) -> Result<Batch> {
        let pool = match partition {
            Partition::Train => &mut self.train,
            Partition::Test => &mut self.test,
        };
        if size > pool.len() {
            return Err(DatasetError::SampleSizeExceeded {
                requested: size,
                available: pool.len(),
                partition,
            });
        }

        let picks = index::sample(&mut self.rng, pool.len(), size);
        let batch: Batch = match self.mode {
            SamplingMode::Preserving => picks.iter().map(|idx| Arc::clone(&pool[idx])).collect(),
            SamplingMode::Draining => {
                let mut picks = picks.into_vec();
                picks.sort_unstable_by(|a, b| b.cmp(a));
                let mut batch: Batch = picks.into_iter().map(|idx| pool.swap_remove(idx)).collect();
                batch.shuffle(&mut self.rng);
                batch
            }
        };

        log::debug!(
            "sampled {} boards from {} pool ({} left)",
            size,
            partition,
            pool.len()
        );
        Ok(batch)
    }
}

/// `BatchSampler` behind a mutex, for several consumers drawing at once.
pub struct SharedSampler<R: Rng> {
    inner: Mutex<BatchSampler<R>>,
}

impl<R: Rng> SharedSampler<R> {
    pub fn new(sampler: BatchSampler<R>) -> Self {
        Self {
            inner: Mutex::new(sampler),
        }
    }

    pub fn sample_batch(&self, size: usize, partition: Partition) -> Result<Batch> {
        self.lock().sample_batch(size, partition)
    }

    pub fn remaining(&self, partition: Partition) -> usize {
        self.lock().remaining(partition)
    }

    pub fn into_inner(self) -> BatchSampler<R> {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BatchSampler<R>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::board::decode;
    use crate::chess::types::{RawRecord, RecordFormat, RecordId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use std::thread;

    fn boards(count: usize) -> Vec<Board> {
        (0..count)
            .map(|ordinal| {
                decode(&RawRecord {
                    id: RecordId { source: 0, ordinal },
                    format: RecordFormat::Tabular,
                    result_text: "pat".to_string(),
                    checkmate: None,
                    fen: "8/8/8/8/8/8/8/8".to_string(),
                })
                .unwrap()
            })
            .collect()
    }

    fn ids(batch: &Batch) -> HashSet<RecordId> {
        batch.iter().map(|board| board.id()).collect()
    }

    #[test]
    fn test_preserving_batch_is_distinct_and_from_pool() {
        let mut sampler =
            BatchSampler::new(boards(20), SamplingMode::Preserving, StdRng::seed_from_u64(42));

        for _ in 0..50 {
            let batch = sampler.sample_batch(10, Partition::Train).unwrap();
            assert_eq!(batch.len(), 10);
            assert_eq!(ids(&batch).len(), 10);
            for board in &batch {
                assert!(
                    sampler
                        .pool(Partition::Train)
                        .iter()
                        .any(|member| Arc::ptr_eq(member, board))
                );
            }
        }
        assert_eq!(sampler.remaining(Partition::Train), 20);
    }

    #[test]
    fn test_identical_positions_stay_distinct() {
        let mut sampler =
            BatchSampler::new(boards(5), SamplingMode::Preserving, StdRng::seed_from_u64(1));
        let batch = sampler.sample_batch(5, Partition::Train).unwrap();

        assert!(batch.iter().all(|b| b.placement() == "8/8/8/8/8/8/8/8"));
        assert_eq!(ids(&batch).len(), 5);
    }

    #[test]
    fn test_full_pool_batch() {
        let mut sampler =
            BatchSampler::new(boards(8), SamplingMode::Preserving, StdRng::seed_from_u64(3));
        let batch = sampler.sample_batch(8, Partition::Train).unwrap();
        assert_eq!(ids(&batch).len(), 8);
    }

    #[test]
    fn test_oversized_request_fails() {
        let mut sampler =
            BatchSampler::new(boards(3), SamplingMode::Preserving, StdRng::seed_from_u64(7));
        let err = sampler.sample_batch(4, Partition::Train).unwrap_err();

        assert!(matches!(
            err,
            DatasetError::SampleSizeExceeded {
                requested: 4,
                available: 3,
                partition: Partition::Train
            }
        ));
    }

    #[test]
    fn test_draining_exhausts_pool() {
        let mut sampler =
            BatchSampler::new(boards(10), SamplingMode::Draining, StdRng::seed_from_u64(11));

        let first = sampler.sample_batch(6, Partition::Train).unwrap();
        let second = sampler.sample_batch(4, Partition::Train).unwrap();
        assert!(ids(&first).is_disjoint(&ids(&second)));
        assert_eq!(ids(&first).len() + ids(&second).len(), 10);
        assert_eq!(sampler.remaining(Partition::Train), 0);

        let err = sampler.sample_batch(1, Partition::Train).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::SampleSizeExceeded { available: 0, .. }
        ));
    }

    #[test]
    fn test_seeded_samplers_agree() {
        let mut left =
            BatchSampler::new(boards(30), SamplingMode::Preserving, StdRng::seed_from_u64(99));
        let mut right =
            BatchSampler::new(boards(30), SamplingMode::Preserving, StdRng::seed_from_u64(99));

        let left_ids: Vec<_> = left
            .sample_batch(12, Partition::Train)
            .unwrap()
            .iter()
            .map(|b| b.id())
            .collect();
        let right_ids: Vec<_> = right
            .sample_batch(12, Partition::Train)
            .unwrap()
            .iter()
            .map(|b| b.id())
            .collect();
        assert_eq!(left_ids, right_ids);
    }

    #[test]
    fn test_split_partitions_are_disjoint() {
        let sampler = BatchSampler::with_split(
            boards(10),
            0.8,
            SamplingMode::Preserving,
            StdRng::seed_from_u64(5),
        )
        .unwrap();

        assert_eq!(sampler.remaining(Partition::Train), 8);
        assert_eq!(sampler.remaining(Partition::Test), 2);
        let train: HashSet<_> = sampler.pool(Partition::Train).iter().map(|b| b.id()).collect();
        let test: HashSet<_> = sampler.pool(Partition::Test).iter().map(|b| b.id()).collect();
        assert!(train.is_disjoint(&test));
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        let result = BatchSampler::with_split(
            boards(4),
            1.5,
            SamplingMode::Preserving,
            StdRng::seed_from_u64(5),
        );
        assert!(matches!(result, Err(DatasetError::InvalidConfig(_))));
    }

    #[test]
    fn test_test_partition_without_split_is_empty() {
        let mut sampler =
            BatchSampler::new(boards(4), SamplingMode::Preserving, StdRng::seed_from_u64(2));
        assert!(sampler.sample_batch(0, Partition::Test).unwrap().is_empty());
        assert!(sampler.sample_batch(1, Partition::Test).is_err());
    }

    #[test]
    fn test_shared_sampler_drains_across_threads() {
        let shared = Arc::new(SharedSampler::new(BatchSampler::new(
            boards(40),
            SamplingMode::Draining,
            StdRng::seed_from_u64(17),
        )));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || shared.sample_batch(10, Partition::Train).unwrap())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for board in handle.join().unwrap() {
                assert!(seen.insert(board.id()));
            }
        }
        assert_eq!(seen.len(), 40);
        assert_eq!(shared.remaining(Partition::Train), 0);
    }
}
