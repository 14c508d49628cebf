//! Declaration feeds shared by unit tests.

/// Export feed covering every script category and a hand-written wrapper.
pub const EXPORT_FEED: &str = "\
/* export.h -- functions exposed to scripts */

#define SCREEN_W
#define SCREEN_H

double MAX (double x, double y);
double MIN (double x, double y);
double rand (double min, double max); /* CODE */
bool file_exists (char *filename);
int get_config_int (const char *section, const char *name, int value);
Sprite *GetSprite (void);
Layer *GetLayer (Sprite *sprite, int index);
void SaveSprite (const char *filename);
void RemoveLayer (void);
";

/// Import feed of script functions called from native code.
pub const IMPORT_FEED: &str = "\
/* import.h -- script functions called from C */

void MaskAll (void);
int CountLayers (Sprite *sprite);
void _ColorCurve (Curve *curve, bool r, const char *name);
";

/// Feed with one unrecognized line (2) and one unsupported parameter (4).
pub const MALFORMED_FEED: &str = "\
void before (void);
typedef int Handle;
/* variadics are not supported */
void bad (int x, ...);
void after (void);
";
