//! The navigation bar shown at the top of every page.

use maud::{Markup, html};

use crate::endpoints;

/// A link in the navigation bar.
///
/// Only one link should be marked as current at any one time.
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 rounded text-blue-700 font-semibold dark:text-blue-500"
        } else {
            "block py-2 px-3 rounded text-gray-900 hover:text-blue-700 \
            dark:text-white dark:hover:text-blue-500"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// The link whose URL equals `active_endpoint` is marked as the current page.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        let links = [
            (endpoints::REPORTS_VIEW, "Reports"),
            (endpoints::EXPENSES, "Expenses"),
            (endpoints::INCOME, "Income"),
            (endpoints::INVESTMENTS, "Investments"),
        ]
        .into_iter()
        .map(|(url, title)| Link {
            url,
            title,
            is_current: active_endpoint == url,
        })
        .collect();

        NavBar { links }
    }

    pub fn into_html(self) -> Markup {
        html!(
            nav class="w-full bg-white border-b border-gray-200 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="flex flex-wrap items-center justify-between max-w-5xl mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="text-xl font-semibold dark:text-white"
                    {
                        "Budget Assistant"
                    }

                    ul class="flex gap-4"
                    {
                        @for link in self.links {
                            li { (link.into_html()) }
                        }
                    }
                }
            }
        )
    }
}
