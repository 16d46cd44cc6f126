use partitioned_vectorizer::{
    collect_matrix, Broadcast, CountVectorizer, Document, HashingVectorizer, Partitioned,
    TfidfVectorizer, Vectorizer, Vocabulary,
};

fn main() -> partitioned_vectorizer::Result<()> {
    env_logger::init();

    // corpus split over three partitions
    let texts = [
        "rust is fast and parallel",
        "rust is safe",
        "parallel code is hard",
        "safe parallel rust code",
        "the borrow checker keeps rust safe",
    ];
    let docs: Vec<Document> = texts.iter().map(|&t| t.into()).collect();
    let corpus = Partitioned::split(docs, 3);

    // counts
    let mut counts = CountVectorizer::new().with_min_df(2u64);
    let blocks = counts.fit_transform(&corpus)?;
    println!("vocabulary: {:?}", counts.feature_names());
    println!("pruned: {:?}", counts.pruned_terms());
    println!("counts:\n{:?}", collect_matrix(&blocks)?.to_dense());

    // ship the vocabulary to another worker
    let bytes = counts.vocabulary_broadcast().map(Broadcast::encode).transpose()?;
    if let Some(bytes) = bytes {
        let remote = CountVectorizer::new().with_vocabulary(Broadcast::<Vocabulary>::decode(&bytes)?);
        let again = remote.transform(&corpus)?;
        println!("remote block rows: {:?}", again.iter().map(|b| b.rows()).collect::<Vec<_>>());
    }

    // tf-idf
    let mut tfidf = TfidfVectorizer::new();
    let weights = collect_matrix(&tfidf.fit_transform(&corpus)?)?;
    println!("idf: {:?}", tfidf.idf().map(|idf| idf.idf().to_vec()));
    println!("tf-idf:\n{:?}", weights.to_dense());

    // hashing
    let hashing = HashingVectorizer::new().with_n_features(16);
    let hashed = collect_matrix(&hashing.transform(&corpus)?)?;
    println!("hashed nnz: {}", hashed.nnz());

    Ok(())
}
