use crate::{
    app::LandmarkModel,
    constants::FACE_MESH_INPUT_SIZE,
    landmarks::{Landmark, LandmarkSet},
    Error, Result,
};
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, Vec3f, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Face-mesh landmark model using `ONNX` Runtime
///
/// Expects a 192x192 RGB input in NHWC layout with values in `[0, 1]`, a
/// first output holding `x, y, z` triples in input pixels and an optional
/// second output holding the face-presence logit.
pub struct FaceMeshModel {
    session: Session,
    input_size: i32,
    landmark_count: usize,
    min_face_presence: f32,
}

impl FaceMeshModel {
    /// Load a face-mesh model from an `ONNX` file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX runtime environment cannot be created
    /// - The ONNX model file cannot be loaded
    /// - The model has no outputs
    pub fn new<P: AsRef<Path>>(model_path: P, landmark_count: usize, min_face_presence: f32) -> Result<Self> {
        log::info!(
            "Initializing FaceMeshModel with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("face_mesh")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.inputs.is_empty() {
            return Err(Error::ModelError("Model has no inputs".to_string()));
        }
        if session.outputs.is_empty() {
            return Err(Error::ModelOutputError("Model has no outputs".to_string()));
        }

        Ok(Self {
            session,
            input_size: FACE_MESH_INPUT_SIZE,
            landmark_count,
            min_face_presence,
        })
    }

    /// Resize, convert to RGB and scale to `[0, 1]`
    #[allow(clippy::cast_sign_loss)] // input size is a positive constant
    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>> {
        let size = self.input_size as usize;
        let channels = 3;

        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let mut data = vec![0.0f32; size * size * channels];
        for row in 0..self.input_size {
            for col in 0..self.input_size {
                let pixel = float_image.at_2d::<Vec3f>(row, col)?;
                let offset = (row as usize * size + col as usize) * channels;
                data[offset..offset + channels].copy_from_slice(&pixel.0);
            }
        }

        Array4::from_shape_vec((1, size, size, channels), data)
            .map_err(|e| Error::ModelError(format!("Failed to create input array: {e}")))
    }

    /// Run the model; returns raw landmark values and the presence logit
    fn forward(&self, input: Array4<f32>) -> Result<(Vec<f32>, Option<f32>)> {
        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;
        let mut outputs = outputs.into_iter();

        let marks_output = outputs
            .next()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;
        let marks_tensor = marks_output.try_extract::<f32>()?;
        let marks = marks_tensor
            .view()
            .as_slice()
            .ok_or_else(|| Error::ModelOutputError("Failed to get landmark data".to_string()))?
            .to_vec();

        let presence = match outputs.next() {
            Some(flag_output) => {
                let flag_tensor = flag_output.try_extract::<f32>()?;
                let flag = flag_tensor.view().iter().next().copied();
                flag
            }
            None => None,
        };

        Ok((marks, presence))
    }

    /// Turn raw model values into normalized landmarks
    #[allow(clippy::cast_precision_loss)]
    fn postprocess(&self, marks: &[f32]) -> Result<LandmarkSet> {
        let needed = self.landmark_count * 3;
        if marks.len() < needed {
            return Err(Error::ModelOutputError(format!(
                "Model returned {} values, expected at least {needed}",
                marks.len()
            )));
        }

        let scale = self.input_size as f32;
        let points = marks[..needed]
            .chunks_exact(3)
            .map(|p| Landmark::new(p[0] / scale, p[1] / scale, p[2] / scale))
            .collect();

        Ok(LandmarkSet::new(points))
    }
}

fn sigmoid(logit: f32) -> f32 {
    1.0 / (1.0 + (-logit).exp())
}

impl LandmarkModel<Mat> for FaceMeshModel {
    fn expected_landmarks(&self) -> usize {
        self.landmark_count
    }

    fn detect(&mut self, frame: &Mat) -> Result<Option<LandmarkSet>> {
        let input = self.preprocess(frame)?;
        let (marks, presence_logit) = self.forward(input)?;

        if let Some(logit) = presence_logit {
            let presence = sigmoid(logit);
            if presence < self.min_face_presence {
                log::trace!("No face (presence {presence:.2})");
                return Ok(None);
            }
        }

        self.postprocess(&marks).map(Some)
    }
}
