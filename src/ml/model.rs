use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        BiLstm, BiLstmConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::softmax,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct EmotionClassifierConfig {
    pub vocab_size:  usize,
    pub num_classes: usize,
    #[config(default = 16)]
    pub embedding_dim: usize,
    #[config(default = 20)]
    pub hidden_size: usize,
}

impl EmotionClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> EmotionClassifier<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device);
        let encoder   = BiLstmConfig::new(self.embedding_dim, self.hidden_size, true).init(device);
        let summarizer = BiLstmConfig::new(2 * self.hidden_size, self.hidden_size, true).init(device);
        let output    = LinearConfig::new(2 * self.hidden_size, self.num_classes).init(device);
        EmotionClassifier {
            embedding, encoder, summarizer, output,
            hidden_size: self.hidden_size,
        }
    }
}

/// Embedding → BiLSTM (every step) → BiLSTM (summary) → Linear
#[derive(Module, Debug)]
pub struct EmotionClassifier<B: Backend> {
    pub embedding:   Embedding<B>,
    pub encoder:     BiLstm<B>,
    pub summarizer:  BiLstm<B>,
    pub output:      Linear<B>,
    pub hidden_size: usize,
}

pub struct ClassificationOutput<B: Backend> {
    pub loss:    Tensor<B, 1>,
    /// [batch, num_classes], before softmax
    pub logits:  Tensor<B, 2>,
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> EmotionClassifier<B> {
    /// tokens: [batch, seq_len] → logits: [batch, num_classes]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let [batch_size, seq_len] = tokens.dims();
        let h = self.hidden_size;

        let x = self.embedding.forward(tokens);          // [batch, seq, emb]
        let (x, _) = self.encoder.forward(x, None);      // [batch, seq, 2h]
        let (x, _) = self.summarizer.forward(x, None);   // [batch, seq, 2h]

        // Forward direction has read the whole sequence at the last step,
        // backward direction at the first.
        let forward_last = x.clone()
            .slice([0..batch_size, seq_len - 1..seq_len, 0..h])
            .reshape([batch_size, h]);
        let backward_first = x
            .slice([0..batch_size, 0..1, h..2 * h])
            .reshape([batch_size, h]);

        let summary = Tensor::cat(vec![forward_last, backward_first], 1); // [batch, 2h]
        self.output.forward(summary)
    }

    /// Sparse categorical cross-entropy over the logits.
    pub fn forward_classification(
        &self,
        tokens:  Tensor<B, 2, Int>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let logits = self.forward(tokens);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets.clone());
        ClassificationOutput { loss, logits, targets }
    }

    /// Class probabilities, rows sum to 1.
    pub fn predict_proba(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        softmax(self.forward(tokens), 1)
    }

    /// (layer, parameter count) for each layer, in order.
    pub fn layer_summary(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("embedding",        self.embedding.num_params()),
            ("bidirectional_1",  self.encoder.num_params()),
            ("bidirectional_2",  self.summarizer.num_params()),
            ("dense",            self.output.num_params()),
        ]
    }
}

/// Number of samples whose arg-max logit matches the target.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let [batch_size, _] = logits.dims();
    let predicted = logits.argmax(1).reshape([batch_size]);
    predicted
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}
