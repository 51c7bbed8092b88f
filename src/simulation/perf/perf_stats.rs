use wasm_bindgen::prelude::*;

/// Timings and counters of the last step. All zero while perf is disabled.
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub(super) step_ms: f64,
    pub(super) chunks_ms: f64,
    pub(super) blocks_ms: f64,
    pub(super) tasks_ms: f64,
    pub(super) active_chunks: u32,
    pub(super) elements_simulated: u32,
    pub(super) elements_moved: u32,
    pub(super) liquid_scans: u32,
    pub(super) element_count: u32,
    pub(super) block_count: u32,
    pub(super) tasks_run: u32,
    pub(super) scans_run: u32,
    pub(super) cells_cleared: u32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter)]
    pub fn chunks_ms(&self) -> f64 { self.chunks_ms }
    #[wasm_bindgen(getter)]
    pub fn blocks_ms(&self) -> f64 { self.blocks_ms }
    #[wasm_bindgen(getter)]
    pub fn tasks_ms(&self) -> f64 { self.tasks_ms }

    #[wasm_bindgen(getter)]
    pub fn active_chunks(&self) -> u32 { self.active_chunks }
    #[wasm_bindgen(getter)]
    pub fn elements_simulated(&self) -> u32 { self.elements_simulated }
    #[wasm_bindgen(getter)]
    pub fn elements_moved(&self) -> u32 { self.elements_moved }
    #[wasm_bindgen(getter)]
    pub fn liquid_scans(&self) -> u32 { self.liquid_scans }
    #[wasm_bindgen(getter)]
    pub fn element_count(&self) -> u32 { self.element_count }
    #[wasm_bindgen(getter)]
    pub fn block_count(&self) -> u32 { self.block_count }

    #[wasm_bindgen(getter)]
    pub fn tasks_run(&self) -> u32 { self.tasks_run }
    #[wasm_bindgen(getter)]
    pub fn scans_run(&self) -> u32 { self.scans_run }
    #[wasm_bindgen(getter)]
    pub fn cells_cleared(&self) -> u32 { self.cells_cleared }
}
