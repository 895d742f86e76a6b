use image::{Rgba, RgbaImage};
use stretch_canvas::processing::color::{BLACK, pack_rgb};
use stretch_canvas::{
    Anchor, CanvasEngine, Error, FitRect, PixelBuffer, Presenter, Size, StretchPolicy,
};

#[derive(Default)]
struct Recorder {
    frames: Vec<PixelBuffer>,
}

impl Presenter for Recorder {
    fn present(&mut self, frame: &PixelBuffer) -> Result<(), Error> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

fn engine(canvas: (u32, u32), viewport: (u32, u32), policy: StretchPolicy) -> CanvasEngine {
    CanvasEngine::new(canvas.into(), viewport.into(), policy, Anchor::TopLeft).unwrap()
}

fn solid(size: Size, rgb: [f32; 3]) -> Vec<f32> {
    rgb.repeat(size.pixel_count() as usize)
}

fn count(screen: &PixelBuffer, word: u32) -> usize {
    screen.pixels().iter().filter(|px| **px == word).count()
}

#[test]
fn new_engine_shows_black_screen() {
    let engine = engine((4, 8), (10, 10), StretchPolicy::NoStretch);
    assert_eq!(engine.viewport(), Size::new(10, 10));
    assert!(engine.screen().pixels().iter().all(|px| *px == BLACK));
}

#[test]
fn native_update_draws_top_left() {
    let mut engine = engine((4, 8), (10, 10), StretchPolicy::NoStretch);
    engine.update_canvas(&solid(Size::new(4, 8), [1.0, 0.0, 0.0])).unwrap();
    let red = pack_rgb(255, 0, 0);
    assert_eq!(engine.screen().get(0, 0), Some(red));
    assert_eq!(engine.screen().get(3, 7), Some(red));
    assert_eq!(engine.screen().get(4, 0), Some(BLACK));
    assert_eq!(count(engine.screen(), red), 32);
}

#[test]
fn full_stretch_covers_viewport() {
    let mut engine = engine((4, 8), (10, 10), StretchPolicy::Full);
    engine.update_canvas(&solid(Size::new(4, 8), [0.0, 1.0, 0.0])).unwrap();
    assert_eq!(count(engine.screen(), pack_rgb(0, 255, 0)), 100);
}

#[test]
fn policy_change_clears_stale_pixels() {
    let mut engine = engine((4, 8), (10, 10), StretchPolicy::Full);
    let blue = pack_rgb(0, 0, 255);
    engine.update_canvas(&solid(Size::new(4, 8), [0.0, 0.0, 1.0])).unwrap();
    assert_eq!(count(engine.screen(), blue), 100);

    engine.set_stretch(StretchPolicy::LargerBorder).unwrap();
    assert_eq!(
        engine.fitted_rect(),
        FitRect {
            x: 0,
            y: 0,
            width: 5,
            height: 10
        }
    );
    assert_eq!(count(engine.screen(), blue), 50);
    assert_eq!(count(engine.screen(), BLACK), 50);
}

#[test]
fn smaller_border_overflow_is_clipped() {
    let mut engine = engine((4, 8), (10, 10), StretchPolicy::SmallerBorder);
    let rect = engine.fitted_rect();
    assert_eq!((rect.width, rect.height), (10, 20));
    engine.update_canvas(&solid(Size::new(4, 8), [1.0, 1.0, 1.0])).unwrap();
    assert_eq!(count(engine.screen(), pack_rgb(255, 255, 255)), 100);
}

#[test]
fn extreme_strip_fits_without_materialising_overflow() {
    let mut engine = CanvasEngine::new(
        Size::new(1, 3000),
        Size::new(3000, 3000),
        StretchPolicy::SmallerBorder,
        Anchor::TopLeft,
    )
    .unwrap();
    assert_eq!(engine.fitted_rect().size(), Size::new(3000, 9_000_000));
    engine.update_canvas(&solid(Size::new(1, 3000), [1.0, 0.0, 0.0])).unwrap();
    assert_eq!(count(engine.screen(), pack_rgb(255, 0, 0)), 9_000_000);
}

#[test]
fn centered_overflow_shows_leading_canvas_columns() {
    let canvas = Size::new(8, 4);
    let mut engine = CanvasEngine::new(
        canvas,
        Size::new(10, 10),
        StretchPolicy::SmallerBorder,
        Anchor::Center,
    )
    .unwrap();
    assert_eq!(
        engine.fitted_rect(),
        FitRect {
            x: 0,
            y: 0,
            width: 20,
            height: 10
        }
    );
    // red encodes the canvas column; green keeps every pixel off black
    let channels: Vec<f32> = (0..canvas.pixel_count())
        .flat_map(|i| [(i % 8) as f32 / 8.0, 1.0, 0.0])
        .collect();
    engine.update_canvas(&channels).unwrap();
    assert_eq!(engine.screen().get(0, 0), engine.canvas().get(0, 0));
    assert_eq!(engine.screen().get(4, 5), engine.canvas().get(1, 2));
    assert_eq!(engine.screen().get(9, 9), engine.canvas().get(3, 3));
    assert_eq!(count(engine.screen(), BLACK), 0);
}

#[test]
fn resize_reallocates_and_refits() {
    let mut engine = engine((4, 8), (10, 10), StretchPolicy::LargerBorder);
    engine.update_canvas(&solid(Size::new(4, 8), [1.0, 0.0, 0.0])).unwrap();
    engine.handle_resize(Size::new(20, 40)).unwrap();
    assert_eq!(engine.viewport(), Size::new(20, 40));
    assert_eq!(engine.screen().pixels().len(), 800);
    assert_eq!(engine.fitted_rect().size(), Size::new(20, 40));
    assert_eq!(count(engine.screen(), pack_rgb(255, 0, 0)), 800);
}

#[test]
fn resize_to_zero_is_rejected_and_keeps_state() {
    let mut engine = engine((4, 8), (10, 10), StretchPolicy::Full);
    assert!(engine.handle_resize(Size::new(0, 10)).is_err());
    assert_eq!(engine.viewport(), Size::new(10, 10));
}

#[test]
fn short_channel_slice_leaves_canvas_unchanged() {
    let mut engine = engine((2, 2), (2, 2), StretchPolicy::NoStretch);
    engine.update_canvas(&solid(Size::new(2, 2), [1.0, 0.0, 0.0])).unwrap();
    let before = engine.canvas().clone();
    let err = engine.update_canvas(&[0.5_f64; 11]).unwrap_err();
    assert!(matches!(err, Error::ChannelUnderflow { needed: 12, got: 11 }));
    assert_eq!(engine.canvas(), &before);
}

#[test]
fn resize_canvas_starts_black_and_refits() {
    let mut engine = engine((4, 8), (10, 10), StretchPolicy::NoStretch);
    engine.update_canvas(&solid(Size::new(4, 8), [1.0, 0.0, 0.0])).unwrap();
    engine.resize_canvas(Size::new(3, 3)).unwrap();
    assert_eq!(engine.canvas().size(), Size::new(3, 3));
    assert_eq!(engine.fitted_rect().size(), Size::new(3, 3));
    assert_eq!(count(engine.screen(), BLACK), 100);
}

#[test]
fn image_update_adopts_image_size() {
    let mut engine = engine((4, 8), (10, 10), StretchPolicy::NoStretch);
    let img = RgbaImage::from_pixel(5, 2, Rgba([0, 0, 255, 255]));
    engine.update_canvas_from_image(&img).unwrap();
    assert_eq!(engine.canvas().size(), Size::new(5, 2));
    assert_eq!(count(engine.screen(), pack_rgb(0, 0, 255)), 10);
    assert_eq!(count(engine.screen(), BLACK), 90);
}

#[test]
fn centered_anchor_offsets_rect() {
    let mut engine = engine((4, 8), (10, 10), StretchPolicy::LargerBorder);
    engine.set_anchor(Anchor::Center).unwrap();
    let rect = engine.fitted_rect();
    assert_eq!((rect.x, rect.y, rect.width, rect.height), (2, 0, 5, 10));
    assert_eq!(engine.anchor(), Anchor::Center);
}

#[test]
fn present_hands_screen_to_presenter() {
    let mut engine = engine((2, 2), (3, 3), StretchPolicy::Full);
    engine.update_canvas(&solid(Size::new(2, 2), [0.0, 1.0, 0.0])).unwrap();
    let mut recorder = Recorder::default();
    engine.present(&mut recorder).unwrap();
    assert_eq!(recorder.frames.len(), 1);
    assert_eq!(&recorder.frames[0], engine.screen());
}
