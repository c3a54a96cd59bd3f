use sd_core::{DepartmentCount, DigestSummary, Error, NewsStore, Result, Tonality, TonalityShare};

/// Turn grouped tonality counts into percentage shares.
///
/// Input order is preserved: the store reports groups in order of first
/// appearance and that order carries through to the output. Each share gets
/// a 1-based index for display numbering.
pub fn distribution_from_counts(counts: &[(String, u64)]) -> Result<Vec<TonalityShare>> {
    let total: u64 = counts.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return Err(Error::Computation(
            "no news articles to aggregate".to_string(),
        ));
    }

    let mut shares = Vec::with_capacity(counts.len());
    for (name, count) in counts {
        // Labels outside the known tonality set never reach the store, so
        // an unknown group here means corrupted data.
        let tonality: Tonality = name.parse()?;
        shares.push(TonalityShare {
            index: shares.len() + 1,
            tonality,
            percentage: (*count as f64 / total as f64) * 100.0,
        });
    }
    Ok(shares)
}

/// Current tonality distribution over the whole article set.
pub async fn tonality_distribution(news: &dyn NewsStore) -> Result<Vec<TonalityShare>> {
    let counts = news.count_by_tonality().await?;
    distribution_from_counts(&counts)
}

/// Article counts grouped by department. Empty store means empty list.
pub async fn department_distribution(news: &dyn NewsStore) -> Result<Vec<DepartmentCount>> {
    let counts = news.count_by_department().await?;
    Ok(counts
        .into_iter()
        .map(|(name, count)| DepartmentCount { name, count })
        .collect())
}

/// Summary for the digest notifier, computed from a fresh read of the
/// article set through the same distribution primitive as the snapshots.
pub async fn digest_summary(news: &dyn NewsStore) -> Result<DigestSummary> {
    let counts = news.count_by_tonality().await?;
    let shares = distribution_from_counts(&counts)?;

    let count_of = |tonality: Tonality| {
        counts
            .iter()
            .find(|(name, _)| name == tonality.as_str())
            .map(|(_, count)| *count)
            .unwrap_or(0)
    };
    let share_of = |tonality: Tonality| {
        shares
            .iter()
            .find(|s| s.tonality == tonality)
            .map(|s| s.percentage)
            .unwrap_or(0.0)
    };

    Ok(DigestSummary {
        negative_count: count_of(Tonality::Negative),
        negative_percentage: share_of(Tonality::Negative),
        positive_percentage: share_of(Tonality::Positive),
        neutral_percentage: share_of(Tonality::Neutral),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> Vec<(String, u64)> {
        pairs
            .iter()
            .map(|(name, count)| (name.to_string(), *count))
            .collect()
    }

    #[test]
    fn ten_articles_split_six_three_one() {
        let shares =
            distribution_from_counts(&counts(&[("positive", 6), ("negative", 3), ("neutral", 1)]))
                .unwrap();

        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0].tonality, Tonality::Positive);
        assert_eq!(shares[0].percentage, 60.0);
        assert_eq!(shares[0].index, 1);
        assert_eq!(shares[1].tonality, Tonality::Negative);
        assert_eq!(shares[1].percentage, 30.0);
        assert_eq!(shares[2].tonality, Tonality::Neutral);
        assert_eq!(shares[2].percentage, 10.0);
        assert_eq!(shares[2].index, 3);
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let shares =
            distribution_from_counts(&counts(&[("neutral", 1), ("positive", 1)])).unwrap();
        assert_eq!(shares[0].tonality, Tonality::Neutral);
        assert_eq!(shares[1].tonality, Tonality::Positive);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let shares =
            distribution_from_counts(&counts(&[("positive", 7), ("negative", 11), ("neutral", 3)]))
                .unwrap();
        let sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn ten_stored_articles_aggregate_through_the_store() {
        use sd_core::{NewsArticle, NewsStore};
        use sd_storage::MemoryStorage;

        let storage = MemoryStorage::new().await.unwrap();
        let mut labels = Vec::new();
        labels.extend([Tonality::Positive; 6]);
        labels.extend([Tonality::Negative; 3]);
        labels.push(Tonality::Neutral);
        for (i, tonality) in labels.into_iter().enumerate() {
            storage
                .insert_article(&NewsArticle {
                    title: format!("Article {i}"),
                    content: "Body".to_string(),
                    link: format!("http://example.com/{i}"),
                    img: format!("http://example.com/{i}.jpg"),
                    language: "en".to_string(),
                    department: "politics".to_string(),
                    source: "example".to_string(),
                    publication_date: chrono::Utc::now(),
                    tonality,
                    score: 0.0,
                })
                .await
                .unwrap();
        }

        let shares = tonality_distribution(&storage).await.unwrap();
        let summary: Vec<(Tonality, f64)> =
            shares.iter().map(|s| (s.tonality, s.percentage)).collect();
        assert_eq!(
            summary,
            vec![
                (Tonality::Positive, 60.0),
                (Tonality::Negative, 30.0),
                (Tonality::Neutral, 10.0),
            ]
        );
    }

    #[tokio::test]
    async fn digest_summary_reuses_the_distribution_arithmetic() {
        use sd_core::{NewsArticle, NewsStore};
        use sd_storage::MemoryStorage;

        let storage = MemoryStorage::new().await.unwrap();
        for tonality in [Tonality::Negative, Tonality::Negative, Tonality::Positive] {
            storage
                .insert_article(&NewsArticle {
                    title: "Headline".to_string(),
                    content: "Body".to_string(),
                    link: "http://example.com/a".to_string(),
                    img: "http://example.com/a.jpg".to_string(),
                    language: "en".to_string(),
                    department: "economy".to_string(),
                    source: "example".to_string(),
                    publication_date: chrono::Utc::now(),
                    tonality,
                    score: -0.4,
                })
                .await
                .unwrap();
        }

        let summary = digest_summary(&storage).await.unwrap();
        assert_eq!(summary.negative_count, 2);
        assert!((summary.negative_percentage - 200.0 / 3.0).abs() < 1e-9);
        assert!((summary.positive_percentage - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.neutral_percentage, 0.0);
    }

    #[test]
    fn empty_set_is_a_computation_error() {
        let err = distribution_from_counts(&[]).unwrap_err();
        assert!(matches!(err, Error::Computation(_)));
    }

    #[test]
    fn unknown_group_label_is_rejected() {
        let err = distribution_from_counts(&counts(&[("sarcastic", 4)])).unwrap_err();
        assert!(matches!(err, Error::Computation(_)));
    }
}
