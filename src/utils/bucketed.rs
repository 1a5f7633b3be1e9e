/*!
# Bucketed Arrays

A fixed number of independently growable buckets (one per node) stored in a single arena.

The key idea (similar to a CSR layout, but mutable):

- A contiguous `buffer: Vec<T>` stores all buckets.
- Every bucket keeps an `(offset, size, size_in, capacity)` record, where the bucket occupies
  `buffer[offset..offset + capacity]` and its live entries are `buffer[offset..offset + size]`.

Each bucket is split into two partitions: the *in*-partition `[0, size_in)` and the *out*-partition
`[size_in, size)`. Using only [`BucketedArray::add_out`] yields a plain list per bucket.

### Growth
Buckets are allocated lazily on first insertion with a small initial capacity. A full bucket is moved
to the end of the arena with doubled capacity (or grown in place if it already is the last bucket).
Abandoned regions are reclaimed by compacting the arena once they make up more than half of it, keeping
appends amortized `O(1)` without one heap allocation per bucket.

### Ordering
Removals swap the last element of a partition into the freed position. Callers must not rely on the
order of elements after a removal.

# Examples
```
use chprep::utils::bucketed::BucketedArray;

let mut arr = BucketedArray::new(3, 2);
arr.add_out(1, 10u32);
arr.add_in(1, 20);
arr.add_out(1, 10);

assert_eq!(arr.in_slice(1), &[20]);
assert_eq!(arr.size(1), 3);

arr.remove(1, 10);
assert_eq!(arr.out_slice(1), &[] as &[u32]);
assert_eq!(arr.size(0), 0);
```
*/

use log::debug;

use crate::Node;

/// Compaction is never attempted while fewer slots than this are abandoned
const MIN_ABANDONED_FOR_COMPACTION: usize = 64;

const GROW_FACTOR: u32 = 2;

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    offset: usize,
    size: u32,
    size_in: u32,
    capacity: u32,
}

impl Bucket {
    #[inline(always)]
    fn end_of_capacity(&self) -> usize {
        self.offset + self.capacity as usize
    }

    #[inline(always)]
    fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.size as usize
    }
}

/// Fixed-size collection of variable-sized, two-partitioned buckets.
///
/// See the [module documentation](self) for details on layout and growth.
#[derive(Debug, Clone)]
pub struct BucketedArray<T> {
    buffer: Vec<T>,
    buckets: Vec<Bucket>,
    initial_capacity: u32,
    abandoned: usize,
}

impl<T> BucketedArray<T>
where
    T: Copy + Default + PartialEq,
{
    /// Creates `size` empty buckets. No bucket allocates before its first insertion.
    ///
    /// # Panics
    /// Panics if `initial_capacity == 0`.
    pub fn new(size: usize, initial_capacity: u32) -> Self {
        assert!(initial_capacity > 0, "buckets need a positive initial capacity");
        Self {
            buffer: Vec::new(),
            buckets: vec![Bucket::default(); size],
            initial_capacity,
            abandoned: 0,
        }
    }

    /// Returns the number of buckets
    #[allow(clippy::len_without_is_empty)]
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of entries in bucket `n` (both partitions)
    #[inline(always)]
    pub fn size(&self, n: Node) -> u32 {
        self.buckets[n as usize].size
    }

    /// Returns the number of entries in the in-partition of bucket `n`
    #[inline(always)]
    pub fn size_in(&self, n: Node) -> u32 {
        self.buckets[n as usize].size_in
    }

    /// Returns the number of entries in the out-partition of bucket `n`
    #[inline(always)]
    pub fn size_out(&self, n: Node) -> u32 {
        let bucket = &self.buckets[n as usize];
        bucket.size - bucket.size_in
    }

    /// Returns the entry at flat position `index` of bucket `n`.
    /// Positions `0..size_in(n)` belong to the in-partition.
    ///
    /// # Panics
    /// Panics if `index >= size(n)`.
    #[inline(always)]
    pub fn get(&self, n: Node, index: u32) -> T {
        self.slice(n)[index as usize]
    }

    /// Returns all live entries of bucket `n`, in-partition first
    #[inline(always)]
    pub fn slice(&self, n: Node) -> &[T] {
        &self.buffer[self.buckets[n as usize].range()]
    }

    /// Returns the in-partition of bucket `n`
    #[inline(always)]
    pub fn in_slice(&self, n: Node) -> &[T] {
        let bucket = &self.buckets[n as usize];
        &self.buffer[bucket.offset..bucket.offset + bucket.size_in as usize]
    }

    /// Returns the out-partition of bucket `n`
    #[inline(always)]
    pub fn out_slice(&self, n: Node) -> &[T] {
        let bucket = &self.buckets[n as usize];
        &self.buffer[bucket.offset + bucket.size_in as usize..bucket.range().end]
    }

    /// Number of slots currently held by the arena (live, spare and abandoned)
    pub fn allocated_slots(&self) -> usize {
        self.buffer.len()
    }

    /// Appends `value` to the out-partition of bucket `n`
    pub fn add_out(&mut self, n: Node, value: T) {
        let bucket = self.reserve_one(n);
        self.buffer[bucket.offset + bucket.size as usize] = value;
        self.buckets[n as usize].size += 1;
    }

    /// Appends `value` to the in-partition of bucket `n`.
    ///
    /// The first entry of the out-partition is moved to the end of the bucket to make room.
    pub fn add_in(&mut self, n: Node, value: T) {
        let bucket = self.reserve_one(n);
        let boundary = bucket.offset + bucket.size_in as usize;
        self.buffer[bucket.offset + bucket.size as usize] = self.buffer[boundary];
        self.buffer[boundary] = value;

        let bucket = &mut self.buckets[n as usize];
        bucket.size_in += 1;
        bucket.size += 1;
    }

    /// Removes **every** occurrence of `value` from both partitions of bucket `n`.
    /// Changes the order of the remaining entries unless only trailing entries are removed.
    pub fn remove(&mut self, n: Node, value: T) {
        let Bucket {
            offset,
            mut size,
            mut size_in,
            ..
        } = self.buckets[n as usize];
        let data = &mut self.buffer[offset..];

        let mut i = 0;
        while i < size_in {
            while size_in > 0 && i < size_in && data[i as usize] == value {
                data[i as usize] = data[(size_in - 1) as usize];
                data[(size_in - 1) as usize] = data[(size - 1) as usize];
                size_in -= 1;
                size -= 1;
            }
            i += 1;
        }

        let mut i = size_in;
        while i < size {
            while size > size_in && i < size && data[i as usize] == value {
                data[i as usize] = data[(size - 1) as usize];
                size -= 1;
            }
            i += 1;
        }

        let bucket = &mut self.buckets[n as usize];
        bucket.size = size;
        bucket.size_in = size_in;
    }

    /// Releases bucket `n` and resets both partitions to zero entries
    pub fn clear(&mut self, n: Node) {
        let bucket = std::mem::take(&mut self.buckets[n as usize]);
        if bucket.capacity == 0 {
            return;
        }

        if bucket.end_of_capacity() == self.buffer.len() {
            self.buffer.truncate(bucket.offset);
        } else {
            self.abandoned += bucket.capacity as usize;
        }
    }

    /// Makes sure bucket `n` can take one more entry and returns its (possibly moved) record
    fn reserve_one(&mut self, n: Node) -> Bucket {
        let bucket = self.buckets[n as usize];
        if bucket.size < bucket.capacity {
            return bucket;
        }

        let capacity = if bucket.capacity == 0 {
            self.initial_capacity
        } else {
            bucket.capacity * GROW_FACTOR
        };

        if bucket.capacity > 0 && bucket.end_of_capacity() == self.buffer.len() {
            // last bucket in the arena can grow in place
            self.buffer
                .resize(bucket.offset + capacity as usize, T::default());
        } else {
            let offset = self.buffer.len();
            self.buffer.extend_from_within(bucket.range());
            self.buffer.resize(offset + capacity as usize, T::default());
            self.abandoned += bucket.capacity as usize;
            self.buckets[n as usize].offset = offset;
        }
        self.buckets[n as usize].capacity = capacity;

        if self.abandoned >= MIN_ABANDONED_FOR_COMPACTION && 2 * self.abandoned > self.buffer.len() {
            self.compact();
        }

        self.buckets[n as usize]
    }

    /// Rewrites the arena without abandoned regions; buckets keep their capacity
    fn compact(&mut self) {
        let live = self.buffer.len() - self.abandoned;
        let mut buffer = Vec::with_capacity(live);

        for bucket in self.buckets.iter_mut().filter(|b| b.capacity > 0) {
            let offset = buffer.len();
            buffer.extend_from_slice(&self.buffer[bucket.offset..bucket.end_of_capacity()]);
            bucket.offset = offset;
        }

        debug!(
            "compacted bucket arena from {} to {} slots",
            self.buffer.len(),
            buffer.len()
        );

        self.buffer = buffer;
        self.abandoned = 0;
    }
}
