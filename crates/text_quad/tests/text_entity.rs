//! Integration tests for the text entity against the recording context
//!
//! These run without a GPU or window, using the fonts bundled in
//! `tests/fonts` so glyph output does not depend on the host.

use std::rc::Rc;

use text_quad::render::shader::TRANSFORM_UNIFORM;
use text_quad::foundation::math::Point3;
use text_quad::render::GlCall;
use text_quad::prelude::*;

fn bundled_fonts() -> FontBook {
    FontBook::from_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts"))
}

fn hi_entity(ctx: &Rc<HeadlessContext>) -> TextEntity<HeadlessContext, HeadlessShader> {
    TextEntity::with_config(
        Rc::clone(ctx),
        HeadlessShader::new(),
        "Hi",
        Rect::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 50.0)),
        &TextConfig::default(),
        bundled_fonts(),
    )
    .unwrap()
}

#[test]
fn test_render_binds_draws_and_unbinds_once() {
    let ctx = Rc::new(HeadlessContext::new());
    let mut text = hi_entity(&ctx);
    let texture = text.texture();

    ctx.clear_calls();
    text.render();
    let calls = ctx.calls();

    let binds: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, call)| **call == GlCall::BindTexture(Some(texture)))
        .map(|(i, _)| i)
        .collect();
    let draws: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, call)| matches!(call, GlCall::DrawIndexedTriangles { .. }))
        .map(|(i, _)| i)
        .collect();
    let unbinds: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, call)| **call == GlCall::BindTexture(None))
        .map(|(i, _)| i)
        .collect();

    assert_eq!(binds.len(), 1);
    assert_eq!(draws.len(), 1);
    assert_eq!(unbinds.len(), 1);
    assert!(binds[0] < draws[0] && draws[0] < unbinds[0]);
    assert_eq!(
        calls[draws[0]],
        GlCall::DrawIndexedTriangles {
            index_count: 6,
            texture: Some(texture),
        }
    );

    assert!(ctx.is_unbound());
    assert!(ctx.take_errors().is_empty());
}

#[test]
fn test_texture_holds_current_raster() {
    let ctx = Rc::new(HeadlessContext::new());
    let mut text = hi_entity(&ctx);

    assert_eq!(ctx.texture_size(text.texture()), Some((500, 500)));
    assert!(ctx.texture_is_linear(text.texture()));
    assert!(ctx.blending_enabled());

    let raster = text.raster().unwrap();
    assert_eq!(ctx.texture_pixels(text.texture()).unwrap(), raster.pixels());

    assert_eq!(text.resolved_font_family(), Some("DejaVu Sans"));
    assert!(raster.covered_texels() > 0, "'Hi' drew no glyphs");

    text.set_text("").unwrap();
    assert!(ctx
        .texture_pixels(text.texture())
        .unwrap()
        .chunks_exact(4)
        .all(|texel| texel[3] == 0));
}

#[test]
fn test_color_reaches_the_texture() {
    let ctx = Rc::new(HeadlessContext::new());
    let mut text = hi_entity(&ctx);

    text.set_color_rgb(255, 0, 0).unwrap();
    let pixels = ctx.texture_pixels(text.texture()).unwrap();
    let covered: Vec<&[u8]> = pixels
        .chunks_exact(4)
        .filter(|texel| texel[3] > 0)
        .collect();
    assert!(!covered.is_empty());
    assert!(covered.iter().all(|texel| texel[..3] == [255, 0, 0]));
}

#[test]
fn test_bgra_upload_is_stored_as_rgba() {
    let ctx = Rc::new(HeadlessContext::new());
    let mut text = TextEntity::with_config(
        Rc::clone(&ctx),
        HeadlessShader::new(),
        "Hi",
        Rect::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 50.0)),
        &TextConfig::default()
            .with_canvas(128, 64)
            .with_pixel_format(PixelFormat::Bgra),
        bundled_fonts(),
    )
    .unwrap();

    ctx.clear_calls();
    text.set_color_rgb(0, 0, 255).unwrap();
    assert!(ctx.calls().contains(&GlCall::UploadTexturePixels {
        width: 128,
        height: 64,
        format: PixelFormat::Bgra,
    }));

    let rgba = text.raster().unwrap().to_format(PixelFormat::Rgba);
    assert_eq!(ctx.texture_pixels(text.texture()).unwrap(), rgba.pixels());
}

#[test]
fn test_spinning_keeps_center_fixed() {
    let ctx = Rc::new(HeadlessContext::new());
    let mut text = hi_entity(&ctx);
    let center = text.shape().center();

    for _ in 0..8 {
        text.shape_mut().rotate_by(std::f32::consts::FRAC_PI_4);
        text.render();

        let shape = *text.shape();
        let pivot = text_quad::render::pivot_matrix(shape.position, shape.extent, shape.rotation);
        let moved = pivot.transform_point(&Point3::new(center.x, center.y, 0.0));
        assert!((moved.x - center.x).abs() < 1e-3);
        assert!((moved.y - center.y).abs() < 1e-3);

        let uploaded = text.shader().matrix(TRANSFORM_UNIFORM).unwrap();
        let expected = text_quad::render::model_matrix(shape.position, shape.extent, shape.rotation);
        assert_eq!(uploaded, expected);
    }
    assert!(ctx.is_unbound());
}

#[test]
fn test_font_fallback_is_reported() {
    let ctx = Rc::new(HeadlessContext::new());
    let mut text = hi_entity(&ctx);

    text.set_font("No Such Family 1234").unwrap();
    assert_eq!(text.font_family(), "No Such Family 1234");
    assert_eq!(text.resolved_font_family(), Some("DejaVu Sans"));

    text.set_font("DejaVu Sans Mono").unwrap();
    assert_eq!(text.resolved_font_family(), Some("DejaVu Sans Mono"));
}

#[test]
fn test_negative_font_size_is_rejected_without_side_effects() {
    let ctx = Rc::new(HeadlessContext::new());
    let mut text = hi_entity(&ctx);
    let before = ctx.texture_pixels(text.texture()).unwrap();

    ctx.clear_calls();
    let err = text.set_font_size(-1).unwrap_err();
    assert!(matches!(err, TextError::InvalidArgument(_)));
    assert_eq!(text.font_size(), 50);
    assert!(ctx.calls().is_empty());
    assert_eq!(ctx.texture_pixels(text.texture()).unwrap(), before);
}

#[test]
fn test_huge_font_size_keeps_canvas_sized_texture() {
    let ctx = Rc::new(HeadlessContext::new());
    let mut text = hi_entity(&ctx);

    text.set_font_size(200_000).unwrap();
    let raster = text.raster().unwrap();
    assert_eq!(raster.pixels().len(), 500 * 500 * 4);
    assert_eq!(ctx.texture_size(text.texture()), Some((500, 500)));
    assert_eq!(ctx.texture_pixels(text.texture()).unwrap(), raster.pixels());
}

#[test]
fn test_entities_are_independent() {
    let ctx = Rc::new(HeadlessContext::new());
    let mut first = hi_entity(&ctx);
    let second = hi_entity(&ctx);
    assert_ne!(first.texture(), second.texture());

    first.set_text("Changed").unwrap();
    assert_eq!(second.text(), "Hi");

    drop(first);
    assert_eq!(ctx.live_textures(), 1);
    drop(second);
    assert_eq!(ctx.live_textures(), 0);
}
