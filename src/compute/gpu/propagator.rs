//! GPU Propagator - GPU-accelerated reaction-diffusion stepping.
//!
//! The CPU copy of the grid stays authoritative: each batch uploads the
//! current buffer, ping-pongs between two storage buffers on the device and
//! reads the result back into the scratch buffer before flipping.

use super::GpuError;
use crate::compute::{Cell, Propagator, PropagatorError, SimulationState};
use crate::schema::SimulationParams;

// Embed shader source at compile time
const REACTION_DIFFUSION_SHADER: &str = include_str!("shaders/reaction_diffusion.wgsl");

const WORKGROUP_SIZE: u32 = 16;

/// Uniform buffer struct for the step shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct StepParams {
    width: u32,
    height: u32,
    model: u32,
    boundary: u32,
    dt: f32,
    du: f32,
    dv: f32,
    feed: f32,
    kill: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
}

impl StepParams {
    fn new(width: usize, height: usize, params: &SimulationParams) -> Self {
        Self {
            width: width as u32,
            height: height as u32,
            model: u8::from(params.model) as u32,
            boundary: u8::from(params.boundary) as u32,
            dt: params.dt,
            du: params.du,
            dv: params.dv,
            feed: params.feed,
            kill: params.kill,
            _pad0: 0.0,
            _pad1: 0.0,
            _pad2: 0.0,
        }
    }
}

/// Device buffers sized for one grid shape.
struct GridBuffers {
    width: usize,
    height: usize,
    cells: [wgpu::Buffer; 2],
    staging: wgpu::Buffer,
    /// `bind_groups[i]` reads `cells[i]` and writes `cells[1 - i]`.
    bind_groups: [wgpu::BindGroup; 2],
}

/// GPU-based reaction-diffusion propagator using a WebGPU compute shader.
pub struct GpuPropagator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,
    buffers: GridBuffers,
}

impl GpuPropagator {
    /// Create a new GPU propagator for a `width` x `height` grid.
    pub async fn new(width: usize, height: usize) -> Result<Self, GpuError> {
        // 1. Create wgpu instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // 2. Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        // 3. Request device and queue
        let (device, queue): (wgpu::Device, wgpu::Queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Turing Patterns GPU"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await?;

        // 4. Shader, layouts and pipeline
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Reaction Diffusion Shader"),
            source: wgpu::ShaderSource::Wgsl(REACTION_DIFFUSION_SHADER.into()),
        });

        let bind_group_layout = create_step_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Step Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            ..Default::default()
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Step Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        // 5. Buffers
        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Step Params"),
            size: std::mem::size_of::<StepParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let buffers = create_grid_buffers(&device, &bind_group_layout, &params_buffer, width, height)?;

        log::info!(
            "GPU propagator ready on {} ({}x{})",
            adapter.get_info().name,
            width,
            height
        );

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            params_buffer,
            buffers,
        })
    }

    /// Grid shape the device buffers are currently sized for.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.buffers.width, self.buffers.height)
    }

    /// Reallocate device buffers when the grid shape changed.
    fn ensure_size(&mut self, width: usize, height: usize) -> Result<(), GpuError> {
        if self.dimensions() != (width, height) {
            self.buffers = create_grid_buffers(
                &self.device,
                &self.bind_group_layout,
                &self.params_buffer,
                width,
                height,
            )?;
        }
        Ok(())
    }

    /// Run `steps` steps on the device and write the result back into `state`.
    pub fn run_steps(
        &mut self,
        state: &mut SimulationState,
        params: &SimulationParams,
        steps: u64,
    ) -> Result<(), GpuError> {
        if steps == 0 {
            return Ok(());
        }
        let width = state.width;
        let height = state.height;
        self.ensure_size(width, height)?;

        let uniforms = StepParams::new(width, height, params);
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.queue.write_buffer(
            &self.buffers.cells[0],
            0,
            bytemuck::cast_slice(state.current()),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Step Encoder"),
            });

        let workgroups_x = (width as u32).div_ceil(WORKGROUP_SIZE);
        let workgroups_y = (height as u32).div_ceil(WORKGROUP_SIZE);

        for i in 0..steps {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Reaction Diffusion Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.buffers.bind_groups[(i % 2) as usize], &[]);
            pass.dispatch_workgroups(workgroups_x, workgroups_y, 1);
        }

        let result = &self.buffers.cells[(steps % 2) as usize];
        encoder.copy_buffer_to_buffer(result, 0, &self.buffers.staging, 0, result.size());
        self.queue.submit(std::iter::once(encoder.finish()));

        self.read_back(state)?;
        state.swap();
        for _ in 0..steps {
            state.advance(params.dt);
        }
        Ok(())
    }

    /// Blocking readback into the scratch buffer.
    fn read_back(&self, state: &mut SimulationState) -> Result<(), GpuError> {
        let buffer_slice = self.buffers.staging.slice(..);

        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        self.device.poll(wgpu::PollType::wait_indefinitely()).ok();
        rx.recv().map_err(|_| GpuError::Readback)??;

        {
            let data = buffer_slice.get_mapped_range();
            let cells: &[Cell] = bytemuck::cast_slice(&data);
            let (_, scratch) = state.split();
            scratch.copy_from_slice(cells);
        }

        self.buffers.staging.unmap();
        Ok(())
    }
}

impl Propagator for GpuPropagator {
    fn run(
        &mut self,
        state: &mut SimulationState,
        params: &SimulationParams,
        steps: u64,
    ) -> Result<(), PropagatorError> {
        self.run_steps(state, params, steps)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "gpu"
    }
}

fn create_grid_buffers(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    params_buffer: &wgpu::Buffer,
    width: usize,
    height: usize,
) -> Result<GridBuffers, GpuError> {
    let bytes = (width as u64)
        .saturating_mul(height as u64)
        .saturating_mul(std::mem::size_of::<Cell>() as u64);
    let limit = device.limits().max_storage_buffer_binding_size as u64;
    if bytes > limit {
        return Err(GpuError::GridTooLarge { bytes, limit });
    }

    let make_cells = |label: &'static str| {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: bytes,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        })
    };
    let cells = [make_cells("Cells A"), make_cells("Cells B")];

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Staging Buffer"),
        size: bytes,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let make_bind_group = |read: &wgpu::Buffer, write: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Step Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: read.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: write.as_entire_binding(),
                },
            ],
        })
    };
    let bind_groups = [
        make_bind_group(&cells[0], &cells[1]),
        make_bind_group(&cells[1], &cells[0]),
    ];

    Ok(GridBuffers {
        width,
        height,
        cells,
        staging,
        bind_groups,
    })
}

fn create_step_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Step Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{CpuPropagator, Seeder};
    use crate::schema::{Boundary, Model, SeedMode, SeedSpec};

    fn seeded(width: usize, height: usize, spec: SeedSpec) -> SimulationState {
        let mut state = SimulationState::new(width, height).unwrap();
        state
            .fill_both(&Seeder::new(width, height).generate(spec))
            .unwrap();
        state
    }

    fn gpu(width: usize, height: usize) -> Option<GpuPropagator> {
        match pollster::block_on(GpuPropagator::new(width, height)) {
            Ok(p) => Some(p),
            Err(GpuError::NoAdapter) => {
                eprintln!("Skipping GPU test: no adapter available");
                None
            }
            Err(e) => panic!("Failed to create GPU propagator: {:?}", e),
        }
    }

    #[test]
    fn test_step_params_layout() {
        assert_eq!(std::mem::size_of::<StepParams>(), 48);
    }

    #[test]
    fn test_gpu_propagator_creation() {
        let Some(propagator) = gpu(32, 32) else {
            return;
        };
        assert_eq!(propagator.dimensions(), (32, 32));
    }

    /// GPU and CPU backends must agree for every model and boundary rule.
    #[test]
    fn test_gpu_cpu_equivalence() {
        let Some(mut gpu_propagator) = gpu(40, 24) else {
            return;
        };
        let spec = SeedSpec::new(SeedMode::RandomSpots, 99.0);

        for model in [Model::GrayScott, Model::FitzHughNagumo, Model::GiererMeinhardt] {
            for boundary in [Boundary::Wrap, Boundary::Reflect, Boundary::Fixed] {
                let params = SimulationParams {
                    model,
                    boundary,
                    dt: if model == Model::GrayScott { 1.0 } else { 0.02 },
                    ..Default::default()
                };
                let mut cpu_state = seeded(40, 24, spec);
                let mut gpu_state = seeded(40, 24, spec);

                CpuPropagator::new().run(&mut cpu_state, &params, 10).unwrap();
                gpu_propagator.run(&mut gpu_state, &params, 10).unwrap();

                assert_eq!(cpu_state.step, gpu_state.step);
                let max_diff = cpu_state
                    .current()
                    .iter()
                    .zip(gpu_state.current())
                    .map(|(a, b)| (a.u - b.u).abs().max((a.v - b.v).abs()))
                    .fold(0.0f32, f32::max);
                assert!(
                    max_diff < 1e-3,
                    "{:?}/{:?}: GPU/CPU mismatch, max diff {:.6}",
                    model,
                    boundary,
                    max_diff
                );
            }
        }
    }

    #[test]
    fn test_gpu_follows_resize() {
        let Some(mut propagator) = gpu(16, 16) else {
            return;
        };
        let mut state = seeded(24, 8, SeedSpec::new(SeedMode::Clear, 0.0));
        propagator
            .run(&mut state, &SimulationParams::default(), 3)
            .unwrap();
        assert_eq!(propagator.dimensions(), (24, 8));
        assert!(state
            .current()
            .iter()
            .all(|c| (c.u - 1.0).abs() < 1e-5 && c.v.abs() < 1e-5));
    }
}
