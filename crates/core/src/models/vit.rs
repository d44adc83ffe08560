use std::{path::Path, sync::Mutex};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::vit;
use hf_hub::{Repo, RepoType, api::sync::Api};
use image::imageops::FilterType;

use super::ImageClassifier;
use crate::{
    error::{Result, ScanError},
    types::Classification,
};

const IMAGE_SIZE: usize = 224;
const MEAN: f32 = 0.5;
const STD: f32 = 0.5;

/// ViT image classifier loaded from a Hugging Face repository
pub struct VitClassifier {
    repo: String,
    model: Mutex<vit::Model>,
    device: Device,
    labels: Vec<String>,
}

impl VitClassifier {
    pub fn load(repo: &str) -> Result<Self> {
        let device = Device::Cpu;
        let fail = |e: &dyn std::fmt::Display| ScanError::model(repo, e);

        tracing::info!("Loading content classifier {} on {:?}", repo, device);

        let api = Api::new().map_err(|e| fail(&e))?;
        let hub = api.repo(Repo::new(repo.to_string(), RepoType::Model));
        let model_path = hub.get("model.safetensors").map_err(|e| fail(&e))?;
        let config_path = hub.get("config.json").map_err(|e| fail(&e))?;

        let raw_config = std::fs::read_to_string(config_path)?;
        let config: vit::Config = serde_json::from_str(&raw_config)?;
        let labels = labels_from_config(&raw_config)?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[model_path], DType::F32, &device)
                .map_err(|e| fail(&e))?
        };
        let model = vit::Model::new(&config, labels.len(), vb).map_err(|e| fail(&e))?;

        tracing::info!("Content classifier loaded with labels {:?}", labels);

        Ok(Self {
            repo: repo.to_string(),
            model: Mutex::new(model),
            device,
            labels,
        })
    }

    fn preprocess(&self, image: &Path) -> Result<Tensor> {
        let rgb = image::open(image)?
            .resize_exact(IMAGE_SIZE as u32, IMAGE_SIZE as u32, FilterType::Triangle)
            .to_rgb8();

        let plane = IMAGE_SIZE * IMAGE_SIZE;
        let mut data = vec![0f32; 3 * plane];
        for (i, pixel) in rgb.pixels().enumerate() {
            for c in 0..3 {
                data[c * plane + i] = (pixel[c] as f32 / 255.0 - MEAN) / STD;
            }
        }

        Tensor::from_vec(data, (1, 3, IMAGE_SIZE, IMAGE_SIZE), &self.device)
            .map_err(|e| ScanError::model(&self.repo, e))
    }
}

/// Labels ordered by class index from the `id2label` map of a HF config
fn labels_from_config(raw_config: &str) -> Result<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(raw_config)?;
    let Some(map) = value.get("id2label").and_then(|v| v.as_object()) else {
        return Err(ScanError::model("vit classifier", "config has no id2label"));
    };

    let mut labels: Vec<(usize, String)> = map
        .iter()
        .filter_map(|(idx, label)| Some((idx.parse().ok()?, label.as_str()?.to_string())))
        .collect();
    labels.sort_by_key(|(idx, _)| *idx);
    Ok(labels.into_iter().map(|(_, label)| label).collect())
}

impl ImageClassifier for VitClassifier {
    fn name(&self) -> &str {
        &self.repo
    }

    fn is_available(&self) -> bool {
        true
    }

    fn classify(&self, image: &Path) -> Result<Vec<Classification>> {
        let input = self.preprocess(image)?;
        let model = self
            .model
            .lock()
            .map_err(|e| ScanError::model(&self.repo, e))?;

        let logits = model
            .forward(&input)
            .map_err(|e| ScanError::model(&self.repo, e))?;
        let probs: Vec<f32> = candle_nn::ops::softmax(&logits, 1)
            .and_then(|p| p.flatten_all())
            .and_then(|p| p.to_vec1())
            .map_err(|e| ScanError::model(&self.repo, e))?;

        let mut results: Vec<Classification> = self
            .labels
            .iter()
            .zip(probs)
            .map(|(label, confidence)| Classification {
                label: label.clone(),
                confidence,
            })
            .collect();
        results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_follow_class_index() {
        let labels =
            labels_from_config(r#"{"id2label": {"1": "nsfw", "0": "normal"}}"#).unwrap();
        assert_eq!(labels, vec!["normal", "nsfw"]);
    }

    #[test]
    fn test_missing_id2label_is_an_error() {
        assert!(labels_from_config("{}").is_err());
    }
}
