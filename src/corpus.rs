//! Immutable corpus model: documents, sentences, word ids.
//!
//! Sentence boundaries are load-bearing here, unlike in a flat
//! bag-of-words model: the sampler binds each token to a panel chosen
//! from a sliding window of nearby sentences.

use serde::{Deserialize, Serialize};

use crate::error::{MgldaError, Result};

/// An ordered sequence of word ids.
///
/// Word ids are indices into the caller's vocabulary and must be less
/// than the corpus vocabulary size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Word ids in sentence order.
    pub words: Vec<usize>,
}

impl Sentence {
    /// Creates a sentence from word ids.
    #[must_use]
    pub fn new(words: Vec<usize>) -> Self {
        Self { words }
    }

    /// Number of tokens in the sentence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the sentence has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// An ordered sequence of sentences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Sentences in document order.
    pub sentences: Vec<Sentence>,
}

impl Document {
    /// Creates a document from sentences.
    #[must_use]
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    /// Number of sentences in the document.
    #[must_use]
    pub fn n_sentences(&self) -> usize {
        self.sentences.len()
    }

    /// Total number of tokens across all sentences.
    #[must_use]
    pub fn n_tokens(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }
}

/// A read-only collection of documents over a fixed vocabulary.
///
/// # Examples
///
/// ```
/// use mglda::corpus::{Corpus, Document, Sentence};
///
/// let corpus = Corpus::new(
///     vec![Document::new(vec![Sentence::new(vec![0, 1, 1])])],
///     2,
/// )
/// .unwrap();
/// assert_eq!(corpus.n_docs(), 1);
/// assert_eq!(corpus.total_tokens(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    docs: Vec<Document>,
    vocab_size: usize,
}

impl Corpus {
    /// Creates a corpus, validating every word id against the vocabulary size.
    ///
    /// # Errors
    ///
    /// Returns [`MgldaError::EmptyCorpus`] if there are no documents or the
    /// vocabulary is empty, and [`MgldaError::WordIdOutOfRange`] if any word
    /// id is `>= vocab_size`.
    pub fn new(docs: Vec<Document>, vocab_size: usize) -> Result<Self> {
        if docs.is_empty() || vocab_size == 0 {
            return Err(MgldaError::EmptyCorpus);
        }
        for doc in &docs {
            for sentence in &doc.sentences {
                for &word in &sentence.words {
                    if word >= vocab_size {
                        return Err(MgldaError::WordIdOutOfRange { word, vocab_size });
                    }
                }
            }
        }
        Ok(Self { docs, vocab_size })
    }

    /// The documents, in order.
    #[must_use]
    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    /// Vocabulary size `W`; word ids range over `[0, W)`.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Number of documents.
    #[must_use]
    pub fn n_docs(&self) -> usize {
        self.docs.len()
    }

    /// Total number of word tokens across the corpus.
    #[must_use]
    pub fn total_tokens(&self) -> usize {
        self.docs.iter().map(Document::n_tokens).sum()
    }
}
