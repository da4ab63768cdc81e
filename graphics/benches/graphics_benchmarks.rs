use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rdg_graphics::backend::DummyBackend;
use rdg_graphics::compiler::CompiledGraph;
use rdg_graphics::graph::{PassNode, RenderGraph};
use rdg_graphics::{
    BufferDescriptor, BufferUsage, FrameGraph, FrameGraphConfig, TextureDescriptor, TextureFormat,
    TextureUsage,
};

fn color(width: u32) -> TextureDescriptor {
    TextureDescriptor::new_2d(
        width,
        1080,
        TextureFormat::Rgba16Float,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    )
}

/// A chain of `length` passes, each reading the previous pass's texture, with
/// a dead side branch every fourth pass.
fn build_chain(length: usize) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let mut previous = None;
    for i in 0..length {
        let target = graph.create_texture(color(1920));
        let mut pass = PassNode::new(format!("pass_{i}")).with_create(target);
        if let Some(input) = previous {
            pass = pass.with_read(input);
        }
        if i + 1 == length {
            pass = pass.as_frame_output();
        }
        graph.add_pass(pass).unwrap();
        previous = Some(target);

        if i % 4 == 0 {
            let debug = graph.create_buffer(BufferDescriptor::new(4096, BufferUsage::STORAGE));
            graph
                .add_pass(PassNode::new(format!("debug_{i}")).with_create(debug))
                .unwrap();
        }
    }
    graph
}

// ---------------------------------------------------------------------------
// Render graph construction
// ---------------------------------------------------------------------------

fn bench_graph_build(c: &mut Criterion) {
    c.bench_function("render_graph_build_32_passes_chain", |b| {
        b.iter(|| black_box(build_chain(32)));
    });
}

// ---------------------------------------------------------------------------
// Render graph compilation
// ---------------------------------------------------------------------------

fn bench_graph_compile_small(c: &mut Criterion) {
    c.bench_function("render_graph_compile_4_passes", |b| {
        b.iter_with_setup(
            || build_chain(4),
            |mut graph| {
                black_box(graph.compile());
            },
        );
    });
}

fn bench_graph_compile_large(c: &mut Criterion) {
    c.bench_function("render_graph_compile_128_passes_chain", |b| {
        b.iter_with_setup(
            || build_chain(128),
            |mut graph| {
                black_box(graph.compile());
            },
        );
    });
}

fn bench_graph_compile_into_reused(c: &mut Criterion) {
    c.bench_function("render_graph_compile_into_128_passes_reused", |b| {
        let mut graph = build_chain(128);
        let mut compiled = CompiledGraph::default();
        b.iter(|| {
            graph.compile_into(&mut compiled);
            black_box(compiled.pass_count());
        });
    });
}

// ---------------------------------------------------------------------------
// Full frames
// ---------------------------------------------------------------------------

fn bench_frame_steady_state(c: &mut Criterion) {
    c.bench_function("frame_graph_16_passes_steady_state", |b| {
        let mut frames = FrameGraph::new(DummyBackend::new(), FrameGraphConfig::default());
        let mut frame = 0u64;
        b.iter(|| {
            frame += 1;
            frames.begin_frame(frame).unwrap();
            let mut previous = None;
            for i in 0..16 {
                let target = frames.create_texture(color(1920 >> (i % 2))).unwrap();
                let mut pass = frames.pass("pass").with_create(target);
                if let Some(input) = previous {
                    pass = pass.with_read(input);
                }
                if i == 15 {
                    pass = pass.as_frame_output();
                }
                frames.add_pass(pass).unwrap();
                previous = Some(target);
            }
            black_box(frames.end_frame().unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_graph_build,
    bench_graph_compile_small,
    bench_graph_compile_large,
    bench_graph_compile_into_reused,
    bench_frame_steady_state,
);

criterion_main!(benches);
