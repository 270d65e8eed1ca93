use {
	crate::{Error, Result, Vec2, HEIGHT, RGBA_SIZE, WIDTH, X, Y},
	png::{BitDepth, ColorType, Transformations},
	std::io::Read,
};

/// Row-major RGBA8 raster.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
	pub width: usize,
	pub height: usize,
	pub data: Vec<u8>,
}

impl core::fmt::Debug for Image {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "Image({}x{})", self.width, self.height)
	}
}

impl Image {
	#[must_use]
	pub fn fromWidthHeight(width: usize, height: usize) -> Self {
		Self { width, height, data: vec![0; width * height * RGBA_SIZE] }
	}

	#[must_use]
	pub fn filled(width: usize, height: usize, rgba: [u8; RGBA_SIZE]) -> Self {
		Self { width, height, data: rgba.repeat(width * height) }
	}

	#[inline(always)]
	#[must_use]
	pub fn dimensions(&self) -> Vec2 {
		[self.width, self.height]
	}

	#[must_use]
	pub fn pixel(&self, [x, y]: Vec2) -> [u8; RGBA_SIZE] {
		let i = (y * self.width + x) * RGBA_SIZE;
		let mut rgba = [0; RGBA_SIZE];
		rgba.copy_from_slice(&self.data[i..i + RGBA_SIZE]);
		rgba
	}

	/// Decodes any PNG color type, normalising to 8-bit RGBA.
	pub fn fromPNG(reader: impl Read) -> Result<Self> {
		let mut decoder = png::Decoder::new(reader);
		decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
		let png = &mut decoder.read_info()?;
		let mut buffer = vec![0; png.output_buffer_size()];
		let frame = png.next_frame(&mut buffer)?;
		buffer.truncate(frame.buffer_size());
		let (width, height) = (frame.width as usize, frame.height as usize);
		let data = match frame.color_type {
			ColorType::Rgba => buffer,
			ColorType::Rgb => expand(&buffer, 3, |p| [p[0], p[1], p[2], u8::MAX]),
			ColorType::GrayscaleAlpha => expand(&buffer, 2, |p| [p[0], p[0], p[0], p[1]]),
			ColorType::Grayscale => expand(&buffer, 1, |p| [p[0], p[0], p[0], u8::MAX]),
			// EXPAND rewrites indexed data as Rgb or Rgba; this arm only fires if the transformations change.
			colorType @ ColorType::Indexed => return Err(Error::UnsupportedColorType(colorType)),
		};
		return Ok(Self { width, height, data });

		fn expand(src: &[u8], srcPixelSize: usize, f: impl Fn(&[u8]) -> [u8; RGBA_SIZE]) -> Vec<u8> {
			let mut dest = Vec::with_capacity(src.len() / srcPixelSize * RGBA_SIZE);
			for pixel in src.chunks_exact(srcPixelSize) {
				dest.extend_from_slice(&f(pixel));
			}
			dest
		}
	}

	pub fn toPNG(&self) -> Result<Vec<u8>> {
		let mut bytes = Vec::new();
		self.writePNG(&mut bytes)?;
		Ok(bytes)
	}

	pub fn writePNG(&self, writer: impl std::io::Write) -> Result<()> {
		let mut png = png::Encoder::new(writer, self.width as _, self.height as _);
		png.set_color(ColorType::Rgba);
		png.set_depth(BitDepth::Eight);
		let mut png = png.write_header()?;
		png.write_image_data(&self.data)?;
		png.finish()?;
		Ok(())
	}

	/// Copies a `dimensions`-sized rectangle of `srcImage` at `srcPoint` to `destPoint`.
	/// Both rectangles must lie within their images.
	pub fn blitPixelsRectangle(&mut self, destPoint: Vec2, dimensions: Vec2, srcImage: &Image, srcPoint: Vec2) {
		let rowLen = dimensions[WIDTH] * RGBA_SIZE;
		for row in 0..dimensions[HEIGHT] {
			let destStart = ((destPoint[Y] + row) * self.width + destPoint[X]) * RGBA_SIZE;
			let srcStart = ((srcPoint[Y] + row) * srcImage.width + srcPoint[X]) * RGBA_SIZE;
			self.data[destStart..destStart + rowLen]
				.copy_from_slice(&srcImage.data[srcStart..srcStart + rowLen]);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn png_roundtrip_preserves_pixels() {
		let mut image = Image::filled(3, 2, [10, 20, 30, 255]);
		image.data[4..8].copy_from_slice(&[1, 2, 3, 4]);
		let decoded = Image::fromPNG(image.toPNG().unwrap().as_slice()).unwrap();
		assert_eq!(decoded, image);
	}

	#[test]
	fn rgb_png_is_expanded_to_opaque_rgba() {
		let mut bytes = Vec::new();
		{
			let mut png = png::Encoder::new(&mut bytes, 2, 1);
			png.set_color(ColorType::Rgb);
			png.set_depth(BitDepth::Eight);
			png.write_header().unwrap().write_image_data(&[1, 2, 3, 4, 5, 6]).unwrap();
		}
		let image = Image::fromPNG(bytes.as_slice()).unwrap();
		assert_eq!(image.dimensions(), [2, 1]);
		assert_eq!(image.data, [1, 2, 3, 255, 4, 5, 6, 255]);
	}

	#[test]
	fn indexed_png_is_expanded_through_its_palette() {
		let mut bytes = Vec::new();
		{
			let mut png = png::Encoder::new(&mut bytes, 2, 1);
			png.set_color(ColorType::Indexed);
			png.set_depth(BitDepth::Eight);
			png.set_palette(&[10, 20, 30, 40, 50, 60][..]);
			png.write_header().unwrap().write_image_data(&[1, 0]).unwrap();
		}
		let image = Image::fromPNG(bytes.as_slice()).unwrap();
		assert_eq!(image.data, [40, 50, 60, 255, 10, 20, 30, 255]);
	}

	#[test]
	fn garbage_is_a_decode_error() {
		assert!(matches!(Image::fromPNG(&b"not a png"[..]), Err(Error::Decode(_))));
	}

	#[test]
	fn blit_copies_only_the_rectangle() {
		let src = Image::filled(2, 2, [9, 9, 9, 9]);
		let mut dest = Image::fromWidthHeight(4, 4);
		dest.blitPixelsRectangle([1, 2], [2, 2], &src, [0, 0]);
		for y in 0..4 {
			for x in 0..4 {
				let expected = if (1..3).contains(&x) && (2..4).contains(&y) { [9; 4] } else { [0; 4] };
				assert_eq!(dest.pixel([x, y]), expected, "({x}, {y})");
			}
		}
	}
}
