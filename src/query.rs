//! Search parameters and the paginated search URL built from them.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::terms::TermCategory;

pub const DEFAULT_HOST: &str = "www.linkedin.com";
const SEARCH_PATH: &str = "/jobs-guest/jobs/api/seeMoreJobPostings/search";

/// Listings returned per page; offsets advance by this much.
pub const PAGE_SIZE: u32 = 25;

/// A job search. Missing fields fall back to [`Query::default`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Query {
    pub host: String,
    pub keyword: String,
    pub location: String,
    pub date_since_posted: String,
    pub job_type: String,
    pub remote_filter: String,
    pub salary: String,
    pub experience_level: String,
    /// `"recent"` or `"relevant"`; anything else leaves the provider default.
    pub sort_by: String,
    /// Maximum number of new records per run. `<= 0` means no limit.
    pub limit: i64,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            keyword: String::new(),
            location: String::new(),
            date_since_posted: String::new(),
            job_type: String::new(),
            remote_filter: String::new(),
            salary: String::new(),
            experience_level: String::new(),
            sort_by: String::new(),
            limit: 0,
        }
    }
}

impl Query {
    pub fn limit(&self) -> Option<usize> {
        usize::try_from(self.limit).ok().filter(|n| *n > 0)
    }

    fn term(&self, category: TermCategory) -> &str {
        match category {
            TermCategory::DateSincePosted => &self.date_since_posted,
            TermCategory::ExperienceLevel => &self.experience_level,
            TermCategory::JobType => &self.job_type,
            TermCategory::RemoteFilter => &self.remote_filter,
            TermCategory::Salary => &self.salary,
        }
    }

    fn sort_code(&self) -> Option<&'static str> {
        match self.sort_by.as_str() {
            "recent" => Some("DD"),
            "relevant" => Some("R"),
            _ => None,
        }
    }

    /// Search URL for the page starting at `start`.
    ///
    /// Filters whose term does not translate are left out; they never block
    /// the remaining filters.
    pub fn search_url(&self, start: u32) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("https://{}{}", self.host, SEARCH_PATH))?;
        {
            let mut qp = url.query_pairs_mut();
            if !self.keyword.is_empty() {
                qp.append_pair("keywords", &self.keyword);
            }
            if !self.location.is_empty() {
                qp.append_pair("location", &self.location);
            }
            // provider expects this order
            for category in [
                TermCategory::DateSincePosted,
                TermCategory::Salary,
                TermCategory::ExperienceLevel,
                TermCategory::RemoteFilter,
                TermCategory::JobType,
            ] {
                let term = self.term(category);
                if term.is_empty() {
                    continue;
                }
                let code = category.translate(term);
                if !code.is_empty() {
                    qp.append_pair(category.param(), code);
                }
            }
            qp.append_pair("start", &start.to_string());
            if let Some(code) = self.sort_code() {
                qp.append_pair("sortBy", code);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn default_query_only_pages() {
        let url = Query::default().search_url(0).unwrap();
        assert_eq!(url.host_str(), Some(DEFAULT_HOST));
        assert_eq!(url.path(), SEARCH_PATH);
        assert_eq!(pairs(&url), vec![("start".into(), "0".into())]);
    }

    #[test]
    fn filters_in_provider_order() {
        let q = Query {
            keyword: "Marketing Operations".into(),
            location: "United States".into(),
            date_since_posted: "past week".into(),
            remote_filter: "remote".into(),
            experience_level: "director".into(),
            job_type: "full time".into(),
            salary: "100000".into(),
            sort_by: "recent".into(),
            ..Query::default()
        };
        let url = q.search_url(50).unwrap();
        let got: Vec<_> = pairs(&url);
        let want: Vec<(String, String)> = [
            ("keywords", "Marketing Operations"),
            ("location", "United States"),
            ("f_TPR", "r604800"),
            ("f_SB2", "4"),
            ("f_E", "5"),
            ("f_WT", "2"),
            ("f_JT", "F"),
            ("start", "50"),
            ("sortBy", "DD"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(got, want);
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn untranslatable_filter_is_dropped_alone() {
        let q = Query {
            job_type: "gig".into(),
            remote_filter: "hybrid".into(),
            sort_by: "relevant".into(),
            ..Query::default()
        };
        let url = q.search_url(0).unwrap();
        let keys: Vec<String> = pairs(&url).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["f_WT", "start", "sortBy"]);
        assert!(url.as_str().ends_with("sortBy=R"));
    }

    #[test]
    fn unknown_sort_is_omitted() {
        let q = Query {
            sort_by: "oldest".into(),
            ..Query::default()
        };
        assert!(!q.search_url(0).unwrap().as_str().contains("sortBy"));
    }

    #[test]
    fn limit_zero_or_negative_is_unbounded() {
        let mut q = Query::default();
        assert_eq!(q.limit(), None);
        q.limit = -3;
        assert_eq!(q.limit(), None);
        q.limit = 5;
        assert_eq!(q.limit(), Some(5));
    }

    #[test]
    fn empty_host_is_rejected() {
        let q = Query {
            host: String::new(),
            ..Query::default()
        };
        assert!(q.search_url(0).is_err());
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let q: Query = serde_json::from_str(
            r#"{"keyword":"rust","dateSincePosted":"24hr","experienceLevel":"senior","limit":20}"#,
        )
        .unwrap();
        assert_eq!(q.host, DEFAULT_HOST);
        assert_eq!(q.keyword, "rust");
        assert_eq!(q.date_since_posted, "24hr");
        assert_eq!(q.experience_level, "senior");
        assert_eq!(q.limit(), Some(20));
        assert!(q.job_type.is_empty());
    }
}
