//! Frame-scoped bump allocation for shaded parameters.
//!
//! Every per-frame parameter vector (the shaded output of each draw command and the owned
//! vertex copies of every binned triangle) lives in a [`FrameArena`]. Allocation takes `&self` and
//! may happen from many tasks at once. Nothing is freed individually: [`FrameArena::reset`]
//! takes `&mut self`, so no slice handed out during the frame can outlive it.

use std::ptr::NonNull;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One heap block owned by the arena. Never moved or freed before `reset`/drop.
struct Chunk {
    base: NonNull<f32>,
    len: usize,
}

// SAFETY: a chunk is a uniquely owned heap block of `f32`; the arena hands out disjoint
// sub-slices only.
unsafe impl Send for Chunk {}

impl Chunk {
    fn new(len: usize) -> Self {
        let block: Box<[f32]> = vec![0.0; len].into_boxed_slice();
        let base = NonNull::from(Box::leak(block)).cast::<f32>();
        Self { base, len }
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: `base`/`len` came from `Box::leak` of a `Box<[f32]>` of exactly `len` items.
        unsafe {
            drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                self.base.as_ptr(),
                self.len,
            )));
        }
    }
}

#[derive(Default)]
struct ArenaState {
    chunks: Vec<Chunk>,
    /// Offset of the first free float in the last chunk.
    cursor: usize,
    allocated: usize,
}

impl ArenaState {
    fn bump(&mut self, len: usize, min_chunk_len: usize) -> NonNull<f32> {
        let fits = self
            .chunks
            .last()
            .is_some_and(|chunk| chunk.len - self.cursor >= len);

        if !fits {
            let grown = self.chunks.last().map_or(min_chunk_len, |chunk| chunk.len * 2);
            self.chunks.push(Chunk::new(grown.max(min_chunk_len).max(len)));
            self.cursor = 0;
        }

        let chunk = &self.chunks[self.chunks.len() - 1];
        // SAFETY: `cursor + len <= chunk.len`, so the offset stays inside the block.
        let ptr = unsafe { NonNull::new_unchecked(chunk.base.as_ptr().add(self.cursor)) };
        self.cursor += len;
        self.allocated += len;
        ptr
    }
}

/// Thread-safe bump allocator for `f32` storage, reset in bulk once per frame.
pub struct FrameArena {
    min_chunk_len: usize,
    state: Mutex<ArenaState>,
}

impl FrameArena {
    pub fn new(min_chunk_len: usize) -> Self {
        Self {
            min_chunk_len: min_chunk_len.max(1),
            state: Mutex::new(ArenaState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ArenaState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocates `len` zeroed floats valid until the next [`reset`](Self::reset).
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_zeroed(&self, len: usize) -> &mut [f32] {
        if len == 0 {
            return &mut [];
        }

        let ptr = self.lock().bump(len, self.min_chunk_len);
        // SAFETY: `bump` reserved `len` floats that no other allocation overlaps. The chunk stays
        // alive for as long as `self` is borrowed, because freeing it needs `&mut self`.
        let slice = unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr(), len) };
        slice.fill(0.0);
        slice
    }

    /// Copies `values` into the arena.
    pub fn alloc_copy(&self, values: &[f32]) -> &[f32] {
        let slice = self.alloc_zeroed(values.len());
        slice.copy_from_slice(values);
        slice
    }

    /// Copies the concatenation of `parts` into one contiguous arena slice.
    pub fn alloc_concat(&self, parts: &[&[f32]]) -> &[f32] {
        let total = parts.iter().map(|part| part.len()).sum();
        let slice = self.alloc_zeroed(total);
        let mut offset = 0;
        for part in parts {
            slice[offset..offset + part.len()].copy_from_slice(part);
            offset += part.len();
        }
        slice
    }

    /// Floats handed out since the last reset.
    pub fn allocated_len(&self) -> usize {
        self.lock().allocated
    }

    /// Floats of backing storage currently held.
    pub fn capacity(&self) -> usize {
        self.lock().chunks.iter().map(|chunk| chunk.len).sum()
    }

    /// Invalidates every allocation at once.
    ///
    /// The largest chunk is kept for the next frame so steady-state frames stop allocating.
    pub fn reset(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(largest) = (0..state.chunks.len()).max_by_key(|&i| state.chunks[i].len) {
            let keep = state.chunks.swap_remove(largest);
            state.chunks.clear();
            state.chunks.push(keep);
        }
        state.cursor = 0;
        state.allocated = 0;
    }
}

impl Default for FrameArena {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ARENA_CHUNK_LEN)
    }
}
