use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use reflex_core::{
    Color, EngineCommand, Level, MathOp, MathProblem, Screen, Stimulus, StimulusKind,
};
use reflex_render::{SceneState, SkiaRenderer};

fn harness() -> (SkiaRenderer, Vec<u8>) {
    let width = 1280u32;
    let height = 720u32;
    let r = SkiaRenderer::new(width, height).expect("renderer");
    let fb = vec![0u8; (width * height * 4) as usize];
    (r, fb)
}

fn reacting_scene() -> SceneState {
    let mut scene = SceneState::new("bench");
    scene.apply_all(&[
        EngineCommand::ShowScreen(Screen::Game),
        EngineCommand::LevelIndicator(Level::new(6).expect("level")),
        EngineCommand::SwipeHints(true),
        EngineCommand::PresentStimulus(Stimulus::new(
            StimulusKind::Left,
            Some(Color::Red),
            true,
        )),
    ]);
    scene.progress = Some((4, 10));
    scene
}

pub fn bench_frame(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_frame");
    g.sample_size(40);

    g.bench_function("stimulus_frame", |b| {
        let scene = reacting_scene();
        b.iter_batched(
            harness,
            |(mut r, mut fb)| black_box(r.render_frame(&scene, &mut fb)),
            BatchSize::SmallInput,
        )
    });

    g.bench_function("steady_math_frame", |b| {
        let mut scene = reacting_scene();
        scene.apply(&EngineCommand::ShowMath(MathProblem {
            lhs: 7,
            rhs: 8,
            op: MathOp::Multiply,
            options: [56, 57, 55, 58],
        }));
        let (mut r, mut fb) = harness();
        // First frame paints the full surface; measure the dirty-region path.
        let _ = r.render_frame(&scene, &mut fb);
        b.iter(|| black_box(r.render_frame(&scene, &mut fb)));
    });

    g.finish();
}

criterion_group!(benches, bench_frame);
criterion_main!(benches);
